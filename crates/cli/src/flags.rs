use clap::ValueEnum;
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum NetworkFormat {
    /// Pick by file extension: `.json` is a JSON document, anything else TSV
    Auto,
    Json,
    Tsv,
}

impl NetworkFormat {
    pub(crate) fn resolve(self, network: &Path) -> NetworkFormat {
        match self {
            NetworkFormat::Auto => {
                let is_json = network
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                if is_json {
                    NetworkFormat::Json
                } else {
                    NetworkFormat::Tsv
                }
            }
            explicit => explicit,
        }
    }
}
