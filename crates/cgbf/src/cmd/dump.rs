use cgbf_stream::{CancelHandle, WindowReader};

use crate::cmd::DumpArgs;
use crate::exit::{stream_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_window, OutputFormat};

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let cancel = CancelHandle::new();
    install_ctrlc_handler(cancel.clone())?;

    let source = args.input.open()?;
    let reader = WindowReader::with_config(source, args.input.stream_config())
        .map_err(|err| stream_error("invalid stream", err))?
        .with_cancel(cancel);

    let mut printed = 0usize;
    for (index, window) in reader.enumerate().take(args.count.unwrap_or(usize::MAX)) {
        let window = window.map_err(|err| stream_error("decode failed", err))?;
        print_window(&window, index, format);
        printed += 1;
    }

    tracing::debug!(windows = printed, "dump complete");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(cancel: CancelHandle) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
