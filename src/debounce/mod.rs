use leptos::prelude::*;
use std::sync::Arc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Coalesces rapid repeated triggers into one delayed invocation.
///
/// `trigger(value)` schedules `action(value)` after the quiet window; any
/// trigger before the window elapses cancels the pending invocation and
/// reschedules with the new value. Only the last value in a quiet window is
/// ever handed to the action, and it runs exactly once per window.
///
/// Fire-and-forget: nothing is returned to the triggering caller. Callers
/// that need the outcome re-read state after the action completes.
///
/// Clones share the pending timer, so cloning into event closures keeps the
/// "at most one pending invocation" guarantee.
pub(crate) struct Debouncer<T> {
    action: Arc<dyn Fn(T) + Send + Sync>,
    delay_ms: i32,
    // Local-storage arena slot: the JS closure is not thread-safe, and
    // everything here runs on the browser thread anyway. Holding the closure
    // (instead of forgetting it) lets a superseded trigger drop it, so
    // cancelled keystrokes don't accumulate leaked closures.
    timer: StoredValue<Option<PendingTimer>, LocalStorage>,
}

struct PendingTimer {
    /// Live timeout handle; cleared to `None` once the callback has run.
    id: Option<i32>,
    /// Keeps the scheduled callback alive. Dropped only from `trigger` or
    /// `cancel`, never from inside its own invocation.
    _cb: Closure<dyn FnMut()>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            delay_ms: self.delay_ms,
            timer: self.timer,
        }
    }
}

impl<T: 'static> Debouncer<T> {
    pub fn new(delay_ms: i32, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            action: Arc::new(action),
            delay_ms,
            timer: StoredValue::new_local(None),
        }
    }

    pub fn trigger(&self, value: T) {
        let Some(win) = web_sys::window() else {
            return;
        };

        clear_pending(&win, self.timer);

        let action = Arc::clone(&self.action);
        let timer = self.timer;
        let mut value = Some(value);
        let cb = Closure::<dyn FnMut()>::new(move || {
            // The handle is spent; the closure itself stays in the slot
            // until the next trigger replaces it.
            timer.update_value(|t| {
                if let Some(pending) = t.as_mut() {
                    pending.id = None;
                }
            });
            if let Some(v) = value.take() {
                action(v);
            }
        });

        let id = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                self.delay_ms,
            )
            .ok();

        self.timer.set_value(Some(PendingTimer { id, _cb: cb }));
    }

    /// Drop a pending invocation without running it.
    #[allow(dead_code)]
    pub fn cancel(&self) {
        if let Some(win) = web_sys::window() {
            clear_pending(&win, self.timer);
        }
    }
}

fn clear_pending(win: &web_sys::Window, timer: StoredValue<Option<PendingTimer>, LocalStorage>) {
    if let Some(Some(pending)) = timer.try_update_value(|t| t.take()) {
        if let Some(id) = pending.id {
            win.clear_timeout_with_handle(id);
        }
    }
}
