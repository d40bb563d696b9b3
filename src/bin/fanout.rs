use oneof::config::FanoutConfig;
use oneof::demo;
use oneof::utils::CancelToken;
use oneof::utils::params_io::take_from_args;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let path = take_from_args(1).map(PathBuf::from);
    let cfg = match FanoutConfig::load(path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("fanout: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match cfg.logger.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("fanout: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelToken::new_root();
    match demo::run(&cfg, &cancel) {
        Ok(reports) => {
            for r in &reports {
                println!(
                    "num = {:>2}: completed = {}, sent = {:?}",
                    r.size, r.delivery.completed, r.delivery.order
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("fanout failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
