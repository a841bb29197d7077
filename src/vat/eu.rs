use serde::Serialize;

/// EU member states (ISO-3166 alpha-2), Greece as "GR" as the processor reports it
pub const EU_MEMBER_STATES: [&str; 27] = [
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
    "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
];

pub fn is_eu_member(country: &str) -> bool {
    EU_MEMBER_STATES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(country.trim()))
}

/// VAT treatment category of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Customer in the seller's own country
    Domestic,
    /// Other EU country, VAT collected
    EuWithVat,
    /// Other EU country, no VAT collected (reverse charge)
    EuReverseCharge,
    ExtraEu,
    UnknownCountry,
}

impl Bucket {
    /// Report order
    pub const ALL: [Bucket; 5] = [
        Bucket::Domestic,
        Bucket::EuWithVat,
        Bucket::EuReverseCharge,
        Bucket::ExtraEu,
        Bucket::UnknownCountry,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Domestic => "Domestic transactions (your company's country)",
            Bucket::EuWithVat => "Intra-EU transactions (with VAT)",
            Bucket::EuReverseCharge => "Intra-EU transactions (with reverse-charged VAT)",
            Bucket::ExtraEu => "Extra-EU transactions",
            Bucket::UnknownCountry => "Unknown transactions",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Bucket::Domestic => "Domestic",
            Bucket::EuWithVat => "EU (VAT)",
            Bucket::EuReverseCharge => "EU (reverse charge)",
            Bucket::ExtraEu => "Extra-EU",
            Bucket::UnknownCountry => "Unknown",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Select the VAT bucket for a payment. Country codes compare case-insensitively.
pub fn classify(country: Option<&str>, vat_applied: bool, home_country: &str) -> Bucket {
    let country = country.map(str::trim).filter(|c| !c.is_empty());
    match country {
        Some(c) if c.eq_ignore_ascii_case(home_country.trim()) => Bucket::Domestic,
        Some(c) if is_eu_member(c) && vat_applied => Bucket::EuWithVat,
        Some(c) if is_eu_member(c) => Bucket::EuReverseCharge,
        Some(_) => Bucket::ExtraEu,
        None => Bucket::UnknownCountry,
    }
}
