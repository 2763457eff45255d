//! 通知提示 (toast)

use crate::web::timer;
use leptos::prelude::*;

const DISMISS_AFTER_MS: u32 = 3_000;

/// Message text and whether it reports a failure.
#[derive(Clone, Copy)]
pub struct Toasts {
    message: RwSignal<Option<(String, bool)>>,
}

impl Toasts {
    fn show(&self, text: String, is_err: bool) {
        let message = self.message;
        message.set(Some((text.clone(), is_err)));
        // A newer toast keeps its own timer; only clear our own text.
        timer::after(DISMISS_AFTER_MS, move || {
            if message.with_untracked(|m| m.as_ref().is_some_and(|(t, _)| *t == text)) {
                message.set(None);
            }
        });
    }

    pub fn ok(&self, text: impl Into<String>) {
        self.show(text.into(), false);
    }

    pub fn err(&self, text: impl Into<String>) {
        self.show(text.into(), true);
    }
}

pub fn provide_toasts() -> Toasts {
    let toasts = Toasts {
        message: RwSignal::new(None),
    };
    provide_context(toasts);
    toasts
}

pub fn use_toasts() -> Toasts {
    use_context::<Toasts>().expect("Toasts should be provided")
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toasts();
    let message = toasts.message;

    view! {
        {move || {
            message
                .get()
                .map(|(text, is_err)| {
                    let class = if is_err {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    view! {
                        <div class="toast toast-top toast-end z-50">
                            <div class=class>
                                <span>{text}</span>
                            </div>
                        </div>
                    }
                })
        }}
    }
}
