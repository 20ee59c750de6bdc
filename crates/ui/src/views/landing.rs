use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn LandingView() -> Element {
    let ctx = use_context::<AppContext>();
    let signed_in = ctx.auth().is_authenticated();

    rsx! {
        div { class: "page landing",
            h1 { "Discover the career that fits you" }
            p { class: "view-subtitle",
                "Answer a few questions about yourself, then a short assessment tailored to your answers."
            }
            div { class: "landing-actions",
                if signed_in {
                    Link { class: "btn btn-primary", to: Route::Assessment {}, "Go to my assessment" }
                } else {
                    Link { class: "btn btn-primary", to: Route::Signup {}, "Create an account" }
                    Link { class: "btn btn-secondary", to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}

#[component]
pub fn NotFoundView(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "page",
            h2 { "Page not found" }
            p { class: "muted", "Nothing lives at /{path}." }
            Link { to: Route::Landing {}, "Back home" }
        }
    }
}
