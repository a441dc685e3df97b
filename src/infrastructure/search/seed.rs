//! Sample ETFs used to bootstrap an empty index

use serde_json::json;

use crate::domain::search::{EtfDocument, EtfRecord};

/// Three reference ETFs covering the world, technology and ESG sectors
pub fn sample_etfs() -> Vec<EtfDocument> {
    vec![
        EtfDocument::new(
            "1",
            EtfRecord::new("Amundi ETF MSCI World UCITS ETF", "FR0010315770")
                .with_sector("monde")
                .with_fees(0.38)
                .with_performance_1y(8.5)
                .with_field("region", json!(["monde"]))
                .with_field("strategy", json!("replication physique"))
                .with_field("esg_score", json!(85))
                .with_field("replication", json!("physique"))
                .with_field("emetteur", json!(["amundi"])),
        ),
        EtfDocument::new(
            "2",
            EtfRecord::new("Lyxor Nasdaq-100 UCITS ETF", "FR0007063177")
                .with_sector("technologie")
                .with_fees(0.35)
                .with_performance_1y(15.2)
                .with_field("region", json!(["usa"]))
                .with_field("strategy", json!("replication synthétique"))
                .with_field("esg_score", json!(70))
                .with_field("replication", json!("synthetique"))
                .with_field("emetteur", json!(["lyxor"])),
        ),
        EtfDocument::new(
            "3",
            EtfRecord::new("BNP Paribas Easy ESG", "LU1792117779")
                .with_sector("esg")
                .with_fees(0.25)
                .with_performance_1y(6.8)
                .with_field("region", json!(["europe"]))
                .with_field("strategy", json!("esg"))
                .with_field("esg_score", json!(95))
                .with_field("replication", json!("physique"))
                .with_field("emetteur", json!(["bnp"])),
        ),
    ]
}
