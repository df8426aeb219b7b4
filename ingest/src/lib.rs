pub mod fetch;
pub mod transform;
pub mod utils;

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tracing::info;

use common::Result;
use common::category::Category;
use common::config::Settings;
use common::naming::AliasTable;

/// Refreshes the three category tables from the public CSV mirror into the
/// data directory the dashboard queries. Intended to run on a schedule,
/// once the upstream publishes a new day.
pub async fn run_ingest_pipeline(config_path: &str) -> Result<()> {
    let config = Settings::new(config_path)?;
    let aliases = AliasTable::new(&config.aliases);
    let data_dir = Path::new(&config.data.dir);
    std::fs::create_dir_all(data_dir)?;

    let client = rquest::Client::new();
    for category in Category::ALL {
        let url = config
            .data
            .source_url
            .replace("{category}", category.source_slug());
        info!(table = category.table_name(), %url, "Fetching dataset");
        let bytes = fetch::download(&client, &url).await?;
        info!(
            table = category.table_name(),
            bytes = bytes.len(),
            "Dataset read, formatting"
        );

        let batch = transform::build_country_table(&bytes, &aliases, config.date.token_style)?;
        let path = data_dir.join(format!("{}.parquet", category.table_name()));
        write_parquet(&batch, &path)?;
        info!(
            table = category.table_name(),
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            path = %path.display(),
            "Wrote table"
        );
    }

    Ok(())
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}
