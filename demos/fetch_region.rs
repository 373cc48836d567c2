use nldas2::{BoundingBox, Geometry, Nldas, NldasError};

#[tokio::main]
async fn main() -> Result<(), NldasError> {
    let client = Nldas::new();

    let dataset = client
        .get_by_geometry()
        .geometry(Geometry::BoundingBox(BoundingBox {
            west: -100.0,
            south: 39.0,
            east: -99.5,
            north: 39.4,
        }))
        .start_date("2022-01-01")
        .end_date("2022-01-02")
        .variables(vec!["prcp".to_string(), "temp".to_string()])
        .call()
        .await?;

    let (times, rows, cols) = dataset.shape();
    println!("{times} hourly stamps over a {rows} x {cols} grid");
    println!("crs: {}, transform: {:?}", dataset.crs, dataset.transform);
    for variable in &dataset.variables {
        println!(
            "{} [{}]: {}",
            variable.name, variable.units, variable.long_name
        );
    }

    Ok(())
}
