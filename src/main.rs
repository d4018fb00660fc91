use hexagg_rs::{
    AggregationConfig, Aggregator, HexAggError, features_from_geojson_file_with_fallback,
};
use std::io;

const USAGE: &str = "usage: hexagg-rs <features.geojson> <category-property[,fallback...]> <EPSG:xxxx> [resolution]";

fn main() -> Result<(), HexAggError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, property, projection) = match args.as_slice() {
        [path, property, projection, ..] => (path, property, projection),
        _ => return Err(HexAggError::ConfigError(USAGE.to_string())),
    };

    let mut config = AggregationConfig::new(projection.as_str());
    if let Some(resolution) = args.get(3) {
        let resolution = resolution
            .parse()
            .map_err(|_| HexAggError::ConfigError(format!("Invalid resolution '{}'", resolution)))?;
        config = config.resolution(resolution);
    }

    // "amenity,building" takes the amenity tag first, then the building type
    let properties: Vec<&str> = property.split(',').map(str::trim).collect();
    let features = features_from_geojson_file_with_fallback(path, &properties)?;
    let output = Aggregator::new(config)?.run(&features)?;

    if output.diagnostics.skipped() > 0 {
        log::warn!(
            "{} of {} features were skipped",
            output.diagnostics.skipped(),
            output.diagnostics.features_total
        );
    }

    output.table.write_csv_to(io::stdout().lock())
}
