use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cgbf {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cgbf");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("stream_format: CGBF v{}", cgbf_stream::VERSION);
    println!(
        "target: {}",
        option_env!("CGBF_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: serde={}, async={}, cli=true",
        cfg!(feature = "serde"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
