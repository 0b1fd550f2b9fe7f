// Timer tick handoff between the TIMG0 ISR and the main loop
//
// The ISR bumps a pending tick counter; the main loop takes the whole
// count at once so ticks that arrive while a slow job runs (a full-screen
// redraw) are not lost. Game time comes from the system timer, not from
// this counter, so missed ticks only delay work, they never skew it.

use core::cell::Cell;

use critical_section::Mutex;

static PENDING_TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
static UPTIME_TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

#[inline]
pub fn signal_timer() {
    critical_section::with(|cs| {
        let pending = PENDING_TICKS.borrow(cs);
        pending.set(pending.get().saturating_add(1));
        let uptime = UPTIME_TICKS.borrow(cs);
        uptime.set(uptime.get().wrapping_add(1));
    });
}

/// Ticks signalled since the last call, or `None` if there were none.
pub fn take_ticks() -> Option<u32> {
    critical_section::with(|cs| {
        let pending = PENDING_TICKS.borrow(cs).replace(0);
        (pending > 0).then_some(pending)
    })
}

pub fn uptime_ticks() -> u32 {
    critical_section::with(|cs| UPTIME_TICKS.borrow(cs).get())
}

/// Busy-wait hint between polls of `take_ticks`.
#[inline]
pub fn relax() {
    core::hint::spin_loop();
}
