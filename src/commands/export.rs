use crate::args::ExportArgs;
use crate::commands::Out;
use crate::{utils, Config, Result};
use chrono::Local;
use std::path::PathBuf;

/// Handles `hotelflow export`: writes `hotelflow_backup_YYYY-MM-DD.csv` into the chosen
/// directory, replacing a backup of the same day. Requires `viewTransactions`.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let app = config.open()?;
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    let csv = app.export_csv(date)?;
    utils::make_dir(args.dir()).await?;
    let path = args.dir().join(&csv.file_name);
    utils::write(&path, &csv.contents).await?;
    Ok(Out::new(
        format!(
            "Exported {} transactions to {}",
            app.transactions().len(),
            path.display()
        ),
        path,
    ))
}
