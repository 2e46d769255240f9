//! Automatic project quotes
//!
//! A fixed catalogue of services, each with a base price and a list of line
//! items. The client's declared budget range scales every item.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::locale;

/// Days a quote remains valid
pub const VALIDITY_DAYS: u64 = 30;

/// Service used when the requested one is not in the catalogue
pub const FALLBACK_SERVICE: &str = "Desarrollo Web";

struct CatalogueEntry {
    service: &'static str,
    base: u32,
    items: &'static [(&'static str, u32)],
}

const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        service: "Desarrollo Web",
        base: 800,
        items: &[
            ("Diseño y maquetación", 300),
            ("Desarrollo frontend", 400),
            ("Optimización SEO", 100),
        ],
    },
    CatalogueEntry {
        service: "Integración de IA",
        base: 1200,
        items: &[
            ("Análisis de requerimientos", 200),
            ("Integración de API IA", 600),
            ("Entrenamiento y configuración", 400),
        ],
    },
    CatalogueEntry {
        service: "Apps Web Progresivas",
        base: 1500,
        items: &[
            ("Desarrollo PWA", 800),
            ("Service Worker", 300),
            ("Configuración offline", 200),
            ("Notificaciones push", 200),
        ],
    },
    CatalogueEntry {
        service: "E-commerce",
        base: 2000,
        items: &[
            ("Desarrollo tienda online", 1000),
            ("Pasarela de pagos", 400),
            ("Panel administrativo", 400),
            ("Sistema de inventario", 200),
        ],
    },
    CatalogueEntry {
        service: "Consultoría Digital",
        base: 400,
        items: &[
            ("Auditoría técnica", 200),
            ("Informe detallado", 100),
            ("Sesión de consultoría", 100),
        ],
    },
];

/// One priced line of a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteItem {
    /// Line description
    pub name: &'static str,
    /// Price in euros after the budget adjustment
    pub price: u32,
}

/// Computed quote returned to the client and rendered into the PDF
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Service as requested by the client
    pub service: String,
    /// Adjusted line items
    pub items: Vec<QuoteItem>,
    /// Sum of the adjusted items
    pub total: u32,
    /// Catalogue base price of the matched service
    pub base_price: u32,
    /// Budget multiplier applied to every item
    pub multiplier: f64,
    /// Expiry date, `dd/mm/yyyy`
    pub valid_until: String,
}

/// Budget multiplier as an integer percentage
fn budget_percent(budget: Option<&str>) -> u32 {
    match budget.map(str::trim) {
        Some("Más de €5,000") => 130,
        Some("€2,000 - €5,000") => 110,
        _ => 100,
    }
}

/// Price the requested service for the declared budget
///
/// Unknown services are priced as [`FALLBACK_SERVICE`]. Each item is scaled
/// and rounded half up independently; the total is the sum of the rounded
/// items.
#[must_use]
pub fn calculate_quote(service: &str, budget: Option<&str>, today: NaiveDate) -> Quote {
    let entry = CATALOGUE
        .iter()
        .find(|entry| entry.service == service)
        .or_else(|| CATALOGUE.iter().find(|entry| entry.service == FALLBACK_SERVICE))
        .unwrap_or(&CATALOGUE[0]);

    let percent = budget_percent(budget);
    let items: Vec<QuoteItem> = entry
        .items
        .iter()
        .map(|&(name, price)| QuoteItem {
            name,
            price: (price * percent + 50) / 100,
        })
        .collect();
    let total = items.iter().map(|item| item.price).sum();

    let valid_until = today
        .checked_add_days(Days::new(VALIDITY_DAYS))
        .unwrap_or(today);

    Quote {
        service: service.to_string(),
        items,
        total,
        base_price: entry.base,
        multiplier: f64::from(percent) / 100.0,
        valid_until: locale::short_date(valid_until),
    }
}
