#![forbid(unsafe_code)]

//! statline demo binary entry point.

use std::cell::RefCell;
use std::env;
use std::io;
use std::process;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use statline_core::{FdProbe, TitleTemplate};
use statline_demo::cli;
use statline_demo::settings_for;
use statline_demo::transfer::{Transfer, sample_files};
use statline_runtime::{Scheduler, StatusDisplay};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let opts = cli::Opts::parse();
    if opts.trace {
        init_tracing();
    }

    let settings = match settings_for(&opts, |key| env::var(key).ok()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("statline-demo: {e}");
            process::exit(2);
        }
    };

    let stdout = io::stdout();
    let probe = match FdProbe::new(&stdout) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            process::exit(1);
        }
    };

    let term = env::var("TERM").ok();
    let mut display = StatusDisplay::new(stdout, probe)
        .with_title_template(TitleTemplate::new("statline-demo", cli::VERSION))
        .with_settings(&settings, term.as_deref());
    display.set_default_title(term.as_deref().unwrap_or("terminal"));
    if !display.is_terminal() {
        debug!("stdout is not a terminal, status output suppressed");
    }
    let display = Rc::new(RefCell::new(display));

    let mut scheduler = Scheduler::new();
    let transfer = Rc::new(RefCell::new(
        Transfer::new(
            display.clone(),
            sample_files(opts.files),
            opts.steps,
            Duration::from_millis(opts.step_ms),
            scheduler.now(),
        )
        .with_log_lines(opts.log_lines),
    ));
    scheduler.register(display.clone());
    scheduler.register(transfer.clone());

    let ticks = scheduler.run_until_idle(thread::sleep);

    let completed = transfer.borrow().completed();
    let mut display = display.borrow_mut();
    display.write_line_fmt(format_args!("{completed} files transferred"));
    display.clear();
    info!(ticks, completed, "demo finished");
}
