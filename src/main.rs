use anyhow::Context;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let clean = sre_checkpoint::run().context("sre-checkpoint failed")?;
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
