use nldas2::{LonLat, Nldas, NldasError};
use std::env;

#[tokio::main]
async fn main() -> Result<(), NldasError> {
    configure_polars_display();
    let client = Nldas::new();

    let output = client
        .get_by_coords()
        .coords(vec![LonLat(-100.0, 40.0), LonLat(-89.6, 35.1)])
        .start_date("2022-01-01")
        .end_date("2022-01-07")
        .variables(vec!["temp".to_string(), "prcp".to_string()])
        .call()
        .await?;

    if let Some(table) = output.into_table() {
        println!("{table}");
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
