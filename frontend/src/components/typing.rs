use std::time::Duration;

use leptos::prelude::*;

pub const TYPING_FRAMES: [&str; 3] = ["Typing.", "Typing..", "Typing..."];
pub const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Frame to show after `tick` interval ticks; the animation loops.
pub fn typing_frame(tick: usize) -> &'static str {
    TYPING_FRAMES[tick % TYPING_FRAMES.len()]
}

/// Animated placeholder shown while a reply is pending. The interval runs
/// only while the component is mounted and is cleared on unmount.
#[component]
pub fn TypingIndicator() -> impl IntoView {
    let (tick, set_tick) = signal(0usize);

    let handle = set_interval_with_handle(
        move || set_tick.update(|t| *t = t.wrapping_add(1)),
        FRAME_INTERVAL,
    )
    .ok();
    on_cleanup(move || {
        if let Some(handle) = handle {
            handle.clear();
        }
    });

    view! {
        <div class="bot-bubble typing">{move || typing_frame(tick.get())}</div>
    }
}
