use clap::Parser;
use portsweep::cli::Args;
use portsweep::{logging, output, ScanError};
use std::any::Any;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    // Keep the default hook quiet; the guard below reports the panic itself.
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(&args)));
    let _ = panic::take_hook();

    let code = match outcome {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            output::print_error(&format!("{:#}", e));
            match e.downcast_ref::<ScanError>() {
                Some(scan_error) if scan_error.is_config() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
        Err(payload) => {
            output::print_error(&format!(
                "program crashed with panic: {}",
                panic_message(payload.as_ref())
            ));
            ExitCode::FAILURE
        }
    };

    if args.pause {
        wait_for_enter();
    }
    code
}

fn run(args: &Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(args.execute())?;
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn wait_for_enter() {
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let _ = io::stdin().lock().read_line(&mut String::new());
}
