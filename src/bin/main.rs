// buzz-wire entry point and main loop
//
// Boot sequence: timer -> config -> board -> exhibit self-test/splash
// Main loop: take timer ticks -> exhibit.tick(now) -> spin until next tick
//
// TIMG0 fires every BASE_TICK_MS. The exhibit decides on its own which
// jobs are due at `now`, so a late wake only delays work. A board init
// failure (panel or expander) halts with the reason on the console: an
// exhibit that cannot show or sense anything must not pretend to run.

#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::{Duration, Instant};
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use static_cell::StaticCell;

use buzz_kernel::cadence::BASE_TICK_MS;
use buzz_kernel::config::parse_config;
use buzz_kernel::{Exhibit, GameState};
use buzz_wire::board::{Board, BoardExhibit};
use buzz_wire::wake::{self, signal_timer, take_ticks};

esp_bootloader_esp_idf::esp_app_desc!();

static CONFIG_FILE: &[u8] = include_bytes!("../../config/buzzwire.txt");

const HEARTBEAT_MS: u64 = 60_000;

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

static EXHIBIT: StaticCell<BoardExhibit> = StaticCell::new();

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    signal_timer();
}

fn now_ms() -> u64 {
    Instant::now().duration_since_epoch().as_millis()
}

fn halt() -> ! {
    loop {
        wake::relax();
    }
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    info!("booting...");

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    let started = critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        let started = timer0.start(Duration::from_millis(BASE_TICK_MS as u64));
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
        started
    });
    if let Err(e) = started {
        error!("timer: {:?}", e);
        halt();
    }
    info!("timer initialized, {} ms tick", BASE_TICK_MS);

    let config = parse_config(CONFIG_FILE);

    let mut delay = Delay::new();
    let board = match Board::init(peripherals, &config, &mut delay) {
        Ok(board) => board,
        Err(e) => {
            error!("board init failed: {}", e);
            halt();
        }
    };
    info!("hardware initialized.");

    let exhibit = EXHIBIT.init(Exhibit::new(config, board.into_hardware(), now_ms()));
    if let Err(e) = exhibit.boot(&mut delay) {
        error!("display self-test failed: {}", e);
        halt();
    }

    let mut last_state = exhibit.state();
    let mut last_heartbeat = now_ms();

    loop {
        if take_ticks().is_none() {
            wake::relax();
            continue;
        }

        let now = now_ms();
        exhibit.tick(now);

        let state = exhibit.state();
        if state != last_state {
            if state == GameState::AwaitingStart {
                info!("exhibit: ready for the next visitor");
            }
            last_state = state;
        }

        if now.saturating_sub(last_heartbeat) >= HEARTBEAT_MS {
            last_heartbeat = now;
            info!(
                "heartbeat: up {} s, state {}, ticks {}",
                now / 1000,
                state,
                wake::uptime_ticks()
            );
        }
    }
}
