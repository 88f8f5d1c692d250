use cgbf_stream::WindowReader;

use crate::cmd::StatsArgs;
use crate::exit::{stream_error, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat, StreamStats};

pub fn run(args: StatsArgs, format: OutputFormat) -> CliResult<i32> {
    let source = args.input.open()?;
    let reader = WindowReader::with_config(source, args.input.stream_config())
        .map_err(|err| stream_error("invalid stream", err))?;

    let mut stats = StreamStats::default();
    for window in reader {
        let window = window.map_err(|err| stream_error("decode failed", err))?;
        stats.add(&window);
    }

    tracing::debug!(windows = stats.windows, cohorts = stats.cohorts, "stats complete");
    print_stats(&stats, format);
    Ok(SUCCESS)
}
