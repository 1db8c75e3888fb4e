use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Write;
use std::panic;

pub fn setup_panic_hook() {
    panic::set_hook(Box::new(panic_hook));
}

fn panic_hook(info: &panic::PanicHookInfo) {
    let mut fmt_error = String::new();
    let _ = writeln!(fmt_error, "{}", info);

    // Honors RUST_BACKTRACE, the engine usually runs us without it.
    let backtrace = Backtrace::capture();

    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(fmt_error, "{}", backtrace);
    }

    log::error!("{}", fmt_error);
    eprintln!("{}", fmt_error);
}
