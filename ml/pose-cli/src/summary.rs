//! `csi-pose summary`

use std::path::Path;

use anyhow::Result;
use pose_dataset::{DatasetSummary, FeatureDataset};

pub fn run(data: &Path, json: bool) -> Result<()> {
    let dataset = FeatureDataset::load(data)?;
    let summary = DatasetSummary::from_dataset(&dataset);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.to_report());
    }
    Ok(())
}
