//! Element names and rendering colors keyed by atom color.

use indexmap::IndexMap;

/// Atom label used for compatibility checks. Usually the atomic number, but
/// any integer typing scheme works as long as both molecules agree on it.
pub type Color = u16;

const UNKNOWN_ELEMENT: &str = "?";
const UNKNOWN_CHEM_COLOR: &str = "white";

/// Rendering information for a single color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementInfo {
    /// Element symbol, e.g. `C`.
    pub symbol: String,
    /// Graphviz color name used as fill color, e.g. `gray`.
    pub chem_color: String,
}

/// Lookup table from [`Color`] to element symbol and fill color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodicTable {
    elements: IndexMap<Color, ElementInfo>,
}

impl PeriodicTable {
    /// An empty table; every color renders as unknown.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            elements: IndexMap::new(),
        }
    }

    /// Registers (or replaces) the entry for `color`.
    pub fn insert(&mut self, color: Color, symbol: impl Into<String>, chem_color: impl Into<String>) {
        self.elements.insert(
            color,
            ElementInfo {
                symbol: symbol.into(),
                chem_color: chem_color.into(),
            },
        );
    }

    /// Element symbol for `color`, or `?` if the color is not registered.
    #[must_use]
    pub fn element(&self, color: Color) -> &str {
        self.elements
            .get(&color)
            .map_or(UNKNOWN_ELEMENT, |e| e.symbol.as_str())
    }

    /// Graphviz fill color for `color`, or `white` if not registered.
    #[must_use]
    pub fn chem_color(&self, color: Color) -> &str {
        self.elements
            .get(&color)
            .map_or(UNKNOWN_CHEM_COLOR, |e| e.chem_color.as_str())
    }

    /// Reverse lookup by element symbol.
    #[must_use]
    pub fn color_of(&self, symbol: &str) -> Option<Color> {
        self.elements
            .iter()
            .find(|(_, info)| info.symbol == symbol)
            .map(|(&color, _)| color)
    }

    /// Number of known elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the table knows no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for PeriodicTable {
    /// Hydrogen through krypton, keyed by atomic number, with CPK-like colors.
    fn default() -> Self {
        const ELEMENTS: [(&str, &str); 36] = [
            ("H", "white"),
            ("He", "cyan"),
            ("Li", "violet"),
            ("Be", "darkgreen"),
            ("B", "salmon"),
            ("C", "gray"),
            ("N", "blue"),
            ("O", "red"),
            ("F", "green"),
            ("Ne", "cyan"),
            ("Na", "violet"),
            ("Mg", "darkgreen"),
            ("Al", "pink"),
            ("Si", "goldenrod"),
            ("P", "orange"),
            ("S", "yellow"),
            ("Cl", "green"),
            ("Ar", "cyan"),
            ("K", "violet"),
            ("Ca", "darkgreen"),
            ("Sc", "pink"),
            ("Ti", "gray"),
            ("V", "pink"),
            ("Cr", "pink"),
            ("Mn", "pink"),
            ("Fe", "darkorange"),
            ("Co", "pink"),
            ("Ni", "brown"),
            ("Cu", "brown"),
            ("Zn", "brown"),
            ("Ga", "pink"),
            ("Ge", "pink"),
            ("As", "pink"),
            ("Se", "pink"),
            ("Br", "brown"),
            ("Kr", "cyan"),
        ];

        let mut table = Self::empty();
        for (i, (symbol, chem_color)) in ELEMENTS.iter().enumerate() {
            table.insert(i as Color + 1, *symbol, *chem_color);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_uses_atomic_numbers() {
        let table = PeriodicTable::default();
        assert_eq!(table.element(6), "C");
        assert_eq!(table.chem_color(8), "red");
        assert_eq!(table.color_of("N"), Some(7));
        assert_eq!(table.len(), 36);
    }

    #[test]
    fn unknown_colors_fall_back() {
        let table = PeriodicTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.element(6), "?");
        assert_eq!(table.chem_color(6), "white");
    }
}
