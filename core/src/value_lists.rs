//! Static value lists shared by requests and responses.

use serde::{Deserialize, Serialize};

/// Kind of document stored as an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Cancel,
    Delivery,
    Draft,
    Estimate,
    Order,
    Proforma,
    Regular,
    ReverseOrder,
    TaxDocument,
}

impl InvoiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceType::Cancel => "cancel",
            InvoiceType::Delivery => "delivery",
            InvoiceType::Draft => "draft",
            InvoiceType::Estimate => "estimate",
            InvoiceType::Order => "order",
            InvoiceType::Proforma => "proforma",
            InvoiceType::Regular => "regular",
            InvoiceType::ReverseOrder => "reverse_order",
            InvoiceType::TaxDocument => "tax_document",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Accreditation,
    Barion,
    Besteron,
    Cash,
    Card,
    Cod,
    Credit,
    Debit,
    Inkaso,
    Gopay,
    Other,
    Paypal,
    PostalOrder,
    Transfer,
    Trustpay,
    Viamo,
}

/// Language of generated PDFs and e-mails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "cze")]
    Czech,
    #[serde(rename = "deu")]
    German,
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "hrv")]
    Croatian,
    #[serde(rename = "hun")]
    Hungarian,
    #[serde(rename = "pol")]
    Polish,
    #[serde(rename = "rom")]
    Romanian,
    #[serde(rename = "rus")]
    Russian,
    #[serde(rename = "slo")]
    Slovak,
    #[serde(rename = "slv")]
    Slovenian,
    #[serde(rename = "ukr")]
    Ukrainian,
}

impl Language {
    /// Code used in URL paths, e.g. `/slo/invoices/pdf/...`.
    pub fn code(self) -> &'static str {
        match self {
            Language::Czech => "cze",
            Language::German => "deu",
            Language::English => "eng",
            Language::Croatian => "hrv",
            Language::Hungarian => "hun",
            Language::Polish => "pol",
            Language::Romanian => "rom",
            Language::Russian => "rus",
            Language::Slovak => "slo",
            Language::Slovenian => "slv",
            Language::Ukrainian => "ukr",
        }
    }
}

/// Period constants accepted by list filters such as `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimeFilter {
    All = 0,
    Today,
    Yesterday,
    /// Use together with explicit `since`/`to` dates.
    SinceTo,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    ThisQuarter,
    ThisWeek,
    LastQuarter,
    LastHour,
    ThisHour,
}

impl TimeFilter {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_type_serde_matches_as_str() {
        for kind in [InvoiceType::Regular, InvoiceType::ReverseOrder, InvoiceType::TaxDocument] {
            let encoded = serde_json::to_value(kind).unwrap();
            assert_eq!(encoded, kind.as_str());
        }
    }

    #[test]
    fn language_serde_matches_code() {
        for lang in [Language::Slovak, Language::English, Language::Czech] {
            assert_eq!(serde_json::to_value(lang).unwrap(), lang.code());
        }
    }

    #[test]
    fn payment_type_uses_snake_case() {
        assert_eq!(serde_json::to_value(PaymentType::PostalOrder).unwrap(), "postal_order");
        let parsed: PaymentType = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(parsed, PaymentType::Transfer);
    }

    #[test]
    fn time_filter_codes() {
        assert_eq!(TimeFilter::All.code(), 0);
        assert_eq!(TimeFilter::SinceTo.code(), 3);
        assert_eq!(TimeFilter::ThisHour.code(), 12);
    }
}
