//! Print every bundle given on the command line with its TextAsset objects.
//!
//! Set `RUST_LOG=debug` to see the decoder's section log.

use std::env;
use std::process::ExitCode;

use unibundle::{Bundle, ClassKind, DecodeOptions};

fn main() -> ExitCode {
    env_logger::init();

    let options = match env::var_os("UNIBUNDLE_CLASSES") {
        Some(path) => match DecodeOptions::new().with_class_list(&path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("{}: {e}", path.to_string_lossy());
                return ExitCode::FAILURE;
            }
        },
        None => DecodeOptions::new(),
    };

    let mut failed = false;
    for path in env::args_os().skip(1) {
        let bundle = match Bundle::open(&path, &options) {
            Ok(bundle) => bundle,
            Err(e) => {
                eprintln!("{}: {e}", path.to_string_lossy());
                failed = true;
                continue;
            }
        };

        println!(
            "<Bundle {} v{} ({})>",
            path.to_string_lossy(),
            bundle.header.format_version,
            bundle.header.unity_version
        );
        for asset in bundle.assets() {
            println!("  <Asset {} format {}>", asset.name, asset.format);
            for obj in asset.objects_of_kind(ClassKind::TextAsset) {
                println!(
                    "    <{} {}> {} bytes",
                    obj.kind(),
                    obj.entry.class_id,
                    obj.bytes().len()
                );
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
