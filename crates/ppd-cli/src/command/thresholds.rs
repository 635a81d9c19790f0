use std::path::PathBuf;

use ppd_core::thresholds::Thresholds;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ThresholdsArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ThresholdsArg) -> anyhow::Result<()> {
    Output::save_json(&Thresholds::default(), arg.output.as_deref())
}
