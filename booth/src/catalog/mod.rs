pub mod sqlite_catalog;

use std::collections::HashMap;

use crate::types::{Booth, BoothId};

#[async_trait::async_trait]
pub trait BoothCatalog: Send + Sync {
    async fn fetch(&self, id: &BoothId) -> anyhow::Result<Option<Booth>>;
    async fn all(&self) -> anyhow::Result<Vec<Booth>>;
}

/// The two standard booths the business rents out.
///
/// Used to seed an empty catalog and as the fixture set in tests.
pub fn standard_booths() -> Vec<Booth> {
    vec![
        Booth {
            id: BoothId::new("cabina1"),
            name: "Cabina 1".to_string(),
            hourly_price_cents: 50_00,
            features: vec![
                "condenser microphone".to_string(),
                "acoustic treatment".to_string(),
            ],
            active: true,
        },
        Booth {
            id: BoothId::new("cabina2"),
            name: "Cabina 2".to_string(),
            hourly_price_cents: 50_00,
            features: vec![
                "condenser microphone".to_string(),
                "acoustic treatment".to_string(),
            ],
            active: true,
        },
    ]
}

/// Fixed in-memory catalog. No writes after construction.
pub struct StaticBoothCatalog {
    booths: HashMap<BoothId, Booth>,
}

impl StaticBoothCatalog {
    pub fn new(booths: Vec<Booth>) -> Self {
        Self {
            booths: booths.into_iter().map(|b| (b.id.clone(), b)).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(standard_booths())
    }
}

#[async_trait::async_trait]
impl BoothCatalog for StaticBoothCatalog {
    async fn fetch(&self, id: &BoothId) -> anyhow::Result<Option<Booth>> {
        Ok(self.booths.get(id).cloned())
    }

    async fn all(&self) -> anyhow::Result<Vec<Booth>> {
        let mut out: Vec<Booth> = self.booths.values().cloned().collect();
        out.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(out)
    }
}
