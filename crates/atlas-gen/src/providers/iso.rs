//! Built-in ISO 3166-1 country table
//!
//! Covers Europe and its immediate neighbours, which is everything the
//! catalog can ask for.

use crate::codes::CountryCode;
use crate::provider::CountryCodeResolver;
use atlas_core::{AtlasError, Result};

struct IsoCountry {
    alpha_2: &'static str,
    alpha_3: &'static str,
    name: &'static str,
    common_name: Option<&'static str>,
    official_name: Option<&'static str>,
}

const fn c(
    alpha_2: &'static str,
    alpha_3: &'static str,
    name: &'static str,
    common_name: Option<&'static str>,
    official_name: Option<&'static str>,
) -> IsoCountry {
    IsoCountry {
        alpha_2,
        alpha_3,
        name,
        common_name,
        official_name,
    }
}

const COUNTRIES: &[IsoCountry] = &[
    c("AL", "ALB", "Albania", None, Some("Republic of Albania")),
    c("AD", "AND", "Andorra", None, Some("Principality of Andorra")),
    c("AM", "ARM", "Armenia", None, Some("Republic of Armenia")),
    c("AT", "AUT", "Austria", None, Some("Republic of Austria")),
    c("AZ", "AZE", "Azerbaijan", None, Some("Republic of Azerbaijan")),
    c("BY", "BLR", "Belarus", None, Some("Republic of Belarus")),
    c("BE", "BEL", "Belgium", None, Some("Kingdom of Belgium")),
    c("BA", "BIH", "Bosnia and Herzegovina", None, Some("Republic of Bosnia and Herzegovina")),
    c("BG", "BGR", "Bulgaria", None, Some("Republic of Bulgaria")),
    c("HR", "HRV", "Croatia", None, Some("Republic of Croatia")),
    c("CY", "CYP", "Cyprus", None, Some("Republic of Cyprus")),
    c("CZ", "CZE", "Czechia", None, Some("Czech Republic")),
    c("DK", "DNK", "Denmark", None, Some("Kingdom of Denmark")),
    c("EE", "EST", "Estonia", None, Some("Republic of Estonia")),
    c("FO", "FRO", "Faroe Islands", None, None),
    c("FI", "FIN", "Finland", None, Some("Republic of Finland")),
    c("FR", "FRA", "France", None, Some("French Republic")),
    c("GE", "GEO", "Georgia", None, None),
    c("DE", "DEU", "Germany", None, Some("Federal Republic of Germany")),
    c("GI", "GIB", "Gibraltar", None, None),
    c("GR", "GRC", "Greece", None, Some("Hellenic Republic")),
    c("GG", "GGY", "Guernsey", None, None),
    c("VA", "VAT", "Holy See (Vatican City State)", None, None),
    c("HU", "HUN", "Hungary", None, None),
    c("IS", "ISL", "Iceland", None, Some("Republic of Iceland")),
    c("IE", "IRL", "Ireland", None, None),
    c("IM", "IMN", "Isle of Man", None, None),
    c("IT", "ITA", "Italy", None, Some("Italian Republic")),
    c("JE", "JEY", "Jersey", None, None),
    c("KZ", "KAZ", "Kazakhstan", None, Some("Republic of Kazakhstan")),
    c("LV", "LVA", "Latvia", None, Some("Republic of Latvia")),
    c("LI", "LIE", "Liechtenstein", None, Some("Principality of Liechtenstein")),
    c("LT", "LTU", "Lithuania", None, Some("Republic of Lithuania")),
    c("LU", "LUX", "Luxembourg", None, Some("Grand Duchy of Luxembourg")),
    c("MT", "MLT", "Malta", None, Some("Republic of Malta")),
    c("MD", "MDA", "Moldova, Republic of", Some("Moldova"), Some("Republic of Moldova")),
    c("MC", "MCO", "Monaco", None, Some("Principality of Monaco")),
    c("ME", "MNE", "Montenegro", None, None),
    c("NL", "NLD", "Netherlands, Kingdom of the", Some("Netherlands"), Some("Kingdom of the Netherlands")),
    c("MK", "MKD", "North Macedonia", None, Some("Republic of North Macedonia")),
    c("NO", "NOR", "Norway", None, Some("Kingdom of Norway")),
    c("PL", "POL", "Poland", None, Some("Republic of Poland")),
    c("PT", "PRT", "Portugal", None, Some("Portuguese Republic")),
    c("RO", "ROU", "Romania", None, None),
    c("RU", "RUS", "Russian Federation", None, None),
    c("SM", "SMR", "San Marino", None, Some("Republic of San Marino")),
    c("RS", "SRB", "Serbia", None, Some("Republic of Serbia")),
    c("SK", "SVK", "Slovakia", None, Some("Slovak Republic")),
    c("SI", "SVN", "Slovenia", None, Some("Republic of Slovenia")),
    c("ES", "ESP", "Spain", None, Some("Kingdom of Spain")),
    c("SJ", "SJM", "Svalbard and Jan Mayen", None, None),
    c("SE", "SWE", "Sweden", None, Some("Kingdom of Sweden")),
    c("CH", "CHE", "Switzerland", None, Some("Swiss Confederation")),
    c("TR", "TUR", "Türkiye", None, Some("Republic of Türkiye")),
    c("UA", "UKR", "Ukraine", None, None),
    c("GB", "GBR", "United Kingdom", None, Some("United Kingdom of Great Britain and Northern Ireland")),
    c("AX", "ALA", "Åland Islands", None, None),
];

/// Static ISO table used as the default `CountryCodeResolver`
#[derive(Default)]
pub struct IsoCountryTable;

impl IsoCountryTable {
    pub fn new() -> Self {
        Self
    }
}

impl CountryCodeResolver for IsoCountryTable {
    fn lookup(&self, name: &str) -> Result<CountryCode> {
        let needle = name.trim().to_lowercase();
        COUNTRIES
            .iter()
            .find(|country| {
                let mut keys = [
                    Some(country.alpha_2),
                    Some(country.alpha_3),
                    Some(country.name),
                    country.common_name,
                    country.official_name,
                ]
                .into_iter()
                .flatten();
                keys.any(|k| k.to_lowercase() == needle)
            })
            .map(|country| CountryCode::new(country.alpha_2))
            .ok_or_else(|| AtlasError::Resolution(name.to_string()))
    }

    fn alternate_names(&self) -> Vec<(CountryCode, String)> {
        COUNTRIES
            .iter()
            .flat_map(|country| {
                [country.common_name, country.official_name]
                    .into_iter()
                    .flatten()
                    .map(move |n| (CountryCode::new(country.alpha_2), n.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let table = IsoCountryTable::new();
        assert_eq!(table.lookup("Belgium").unwrap().as_str(), "be");
        assert_eq!(table.lookup("belgium").unwrap().as_str(), "be");
        assert_eq!(table.lookup("DEU").unwrap().as_str(), "de");
        assert_eq!(table.lookup("Netherlands").unwrap().as_str(), "nl");
        assert_eq!(table.lookup("Czech Republic").unwrap().as_str(), "cz");
    }

    #[test]
    fn test_lookup_failure() {
        let table = IsoCountryTable::new();
        assert!(matches!(
            table.lookup("Bosnia and Herz."),
            Err(AtlasError::Resolution(_))
        ));
        assert!(table.lookup("Kosovo").is_err());
    }

    #[test]
    fn test_alternate_names_cover_official() {
        let table = IsoCountryTable::new();
        let names = table.alternate_names();
        assert!(names
            .iter()
            .any(|(code, n)| code.as_str() == "mk" && n.contains("North Macedonia")));
        // Countries without common or official names contribute nothing
        assert!(!names.iter().any(|(code, _)| code.as_str() == "hu"));
    }
}
