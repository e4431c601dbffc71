//! Kaplan-Meier curve CSV export

use std::{fmt::Write as _, fs, path::Path};

use anyhow::Context;
use cohortsurv_analysis::{group::GroupLabel, survival::ComparisonReport};
use cohortsurv_stats::survival::KaplanMeierCurve;

const CSV_HEADER: &str = "case_id,time,status,num_at_risk,survival_rate\n";

/// Save the KM curve of each cohort to `{event}_{group}_km.csv` in `dir`
pub(super) fn save_km_curves(dir: &Path, comparison: &ComparisonReport) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    for group in GroupLabel::ALL {
        let csv_path = dir.join(format!(
            "{}_{}_km.csv",
            comparison.event.id(),
            group.as_str()
        ));
        let csv_content = km_curve_csv(&comparison.summary(group).km_curve)
            .with_context(|| format!("Failed to format {} KM curve", group.as_str()))?;

        fs::write(&csv_path, csv_content)
            .with_context(|| format!("Failed to write CSV file: {}", csv_path.display()))?;
        log::info!("KM curve saved to: {}", csv_path.display());
    }

    Ok(())
}

fn km_curve_csv(curve: &KaplanMeierCurve) -> anyhow::Result<String> {
    let mut csv_content = String::from(CSV_HEADER);
    for point in curve.iter() {
        writeln!(
            &mut csv_content,
            "{},{},{},{},{}",
            point.case_id,
            point.time,
            point.status.code(),
            point.num_at_risk,
            point.survival_rate
        )
        .with_context(|| format!("Failed to write CSV data for case {}", point.case_id))?;
    }
    Ok(csv_content)
}
