// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{fmt::Display, time::Duration};

use verify_tools::core::orchestrator::CancelHandle;

use style::{BOLD, ERROR, WARN};

mod style;

pub fn print_error(err: impl Display) {
    eprintln!("{ERROR}error{ERROR:#}{BOLD}:{BOLD:#} {err}");
}

pub fn print_warning(msg: impl Display) {
    eprintln!("{WARN}warning{WARN:#}{BOLD}:{BOLD:#} {msg}");
}

/// Cancel the run on Ctrl-C, or once `timeout` has elapsed.
pub fn cancel_on_signal(handle: CancelHandle, timeout: Option<Duration>) {
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => print_warning("interrupted, reporting partial results"),
                Err(err) => {
                    log::debug!("unable to listen for ctrl-c: {err}");
                    (&mut deadline).await;
                    print_warning("timed out, reporting partial results");
                }
            },
            () = &mut deadline => print_warning("timed out, reporting partial results"),
        }
        handle.cancel();
    });
}
