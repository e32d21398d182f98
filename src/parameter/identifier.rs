use serde::{Deserialize, Serialize};

/// Identifier field used to match parameter records against queried substances.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierOption {
    Cas,
    #[default]
    Name,
    IupacName,
    Formula,
}

/// A collection of identifiers of a substance.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    /// CAS number
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// Commonly used english name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// IUPAC name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,
    /// Chemical formula
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Identifier {
    /// Create a new identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// # use realgas::parameter::Identifier;
    /// let methane = Identifier::new(Some("74-82-8"), Some("methane"), None, Some("CH4"));
    /// assert_eq!(methane.to_string(), "Identifier(cas=74-82-8, name=methane, formula=CH4)");
    /// ```
    pub fn new(
        cas: Option<&str>,
        name: Option<&str>,
        iupac_name: Option<&str>,
        formula: Option<&str>,
    ) -> Identifier {
        Identifier {
            cas: cas.map(Into::into),
            name: name.map(Into::into),
            iupac_name: iupac_name.map(Into::into),
            formula: formula.map(Into::into),
        }
    }

    /// Identifier that only carries a name.
    pub fn from_name(name: &str) -> Identifier {
        Self::new(None, Some(name), None, None)
    }

    pub fn as_str(&self, option: IdentifierOption) -> Option<&str> {
        match option {
            IdentifierOption::Cas => self.cas.as_deref(),
            IdentifierOption::Name => self.name.as_deref(),
            IdentifierOption::IupacName => self.iupac_name.as_deref(),
            IdentifierOption::Formula => self.formula.as_deref(),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<_> = [
            ("cas", &self.cas),
            ("name", &self.name),
            ("iupac_name", &self.iupac_name),
            ("formula", &self.formula),
        ]
        .into_iter()
        .filter_map(|(key, id)| id.as_ref().map(|id| format!("{}={}", key, id)))
        .collect();
        write!(f, "Identifier({})", ids.join(", "))
    }
}
