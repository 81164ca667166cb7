//! Graphviz rendering of product graphs and fragments.
//!
//! Node lines are indented with a tab, edge lines are not:
//!
//! ```text
//! graph G {
//! 	overlap=scale
//! 	0[style="filled,bold",fillcolor=gray,label="0 (C)"]
//! 	1[style="filled,dashed",fillcolor=gray,label="1 (C)"]
//! 0 -- 1
//! }
//! ```

use std::fmt::{self, Display, Formatter};
use std::io;

use mcis_molecule::{Atom, Molecule};

use crate::{Fragment, Product};

/// Display adapter rendering a [`Product`].
pub struct ProductDot<'p, 'a> {
    product: &'p Product<'a>,
    properties: &'p [&'p str],
}

/// Display adapter rendering a [`Fragment`].
pub struct FragmentDot<'f> {
    fragment: &'f Fragment,
}

impl<'a> Product<'a> {
    /// Renders the product graph. Without `properties`, nodes are bare ids.
    /// Otherwise each node is filled with the color of its first-molecule
    /// atom and labelled with the `value1,value2` pairs of the requested
    /// properties that both molecules define (strings, then doubles, ints
    /// and bools).
    #[must_use]
    pub fn dot<'p>(&'p self, properties: &'p [&'p str]) -> ProductDot<'p, 'a> {
        ProductDot {
            product: self,
            properties,
        }
    }

    /// Renders the product graph, labelling nodes with `properties`.
    #[must_use]
    pub fn to_dot(&self, properties: &[&str]) -> String {
        self.dot(properties).to_string()
    }

    /// # Errors
    ///
    /// Propagates write errors of `out`.
    pub fn write_dot<W: io::Write>(&self, mut out: W, properties: &[&str]) -> io::Result<()> {
        write!(out, "{}", self.dot(properties))
    }
}

impl Fragment {
    /// Lazily rendered Graphviz form of the fragment.
    #[must_use]
    pub const fn dot(&self) -> FragmentDot<'_> {
        FragmentDot { fragment: self }
    }

    /// Renders the fragment.
    #[must_use]
    pub fn to_dot(&self) -> String {
        self.dot().to_string()
    }

    /// # Errors
    ///
    /// Propagates write errors of `out`.
    pub fn write_dot<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self.dot())
    }
}

/// Requested property names present in both key lists, in request order.
fn shared<'p>(requested: &[&'p str], keys1: &[&str], keys2: &[&str]) -> Vec<&'p str> {
    requested
        .iter()
        .copied()
        .filter(|k| keys1.contains(k) && keys2.contains(k))
        .collect()
}

fn value<T: Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl ProductDot<'_, '_> {
    fn label(&self, u: Atom, v: Atom) -> Vec<String> {
        let (m1, m2): (&Molecule, &Molecule) = (self.product.mol1(), self.product.mol2());
        let mut parts = Vec::new();
        for key in shared(self.properties, &m1.string_property_keys(), &m2.string_property_keys()) {
            parts.push(format!(
                "{},{}",
                value(m1.string_property(u, key)),
                value(m2.string_property(v, key))
            ));
        }
        for key in shared(self.properties, &m1.double_property_keys(), &m2.double_property_keys()) {
            parts.push(format!(
                "{},{}",
                value(m1.double_property(u, key)),
                value(m2.double_property(v, key))
            ));
        }
        for key in shared(self.properties, &m1.int_property_keys(), &m2.int_property_keys()) {
            parts.push(format!(
                "{},{}",
                value(m1.int_property(u, key)),
                value(m2.int_property(v, key))
            ));
        }
        for key in shared(self.properties, &m1.bool_property_keys(), &m2.bool_property_keys()) {
            parts.push(format!(
                "{},{}",
                value(m1.bool_property(u, key)),
                value(m2.bool_property(v, key))
            ));
        }
        parts
    }
}

impl Display for ProductDot<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph G {{")?;
        writeln!(f, "\toverlap=scale")?;
        writeln!(f, "\tlayout=neato")?;

        let graph = self.product.graph();
        for node in graph.node_indices() {
            write!(f, "\t{}", node.index())?;
            if !self.properties.is_empty() {
                let pair = &graph[node];
                let style = if pair.is_reduced() {
                    "\"filled,bold\""
                } else {
                    "filled"
                };
                write!(
                    f,
                    "[style={},fillcolor={},label=\"{}\"]",
                    style,
                    self.product.mol1().chem_color(pair.mol1()),
                    self.label(pair.mol1(), pair.mol2()).join("\\n")
                )?;
            }
            writeln!(f)?;
        }

        for edge in graph.edge_indices() {
            let Some((u, v)) = graph.edge_endpoints(edge) else {
                continue;
            };
            write!(f, "{} -- {}", u.index(), v.index())?;
            if !graph[edge] {
                write!(f, " [style=dashed]")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "}}")
    }
}

impl Display for FragmentDot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mol = self.fragment.molecule();
        writeln!(f, "graph G {{")?;
        writeln!(f, "\toverlap=scale")?;

        for atom in mol.atoms() {
            let style = if self.fragment.is_core(atom) {
                "filled,bold"
            } else {
                "filled,dashed"
            };
            writeln!(
                f,
                "\t{}[style=\"{}\",fillcolor={},label=\"{} ({})\"]",
                atom.index(),
                style,
                mol.chem_color(atom),
                mol.id(atom),
                mol.element(atom)
            )?;
        }

        for (u, v) in mol.bonds() {
            writeln!(f, "{} -- {}", u.index(), v.index())?;
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use mcis_molecule::{AtomId, PropertyValue};

    use super::*;
    use crate::{Config, NodeId};

    fn ethane(name1: &str, name2: &str) -> Molecule {
        let mut mol = Molecule::new();
        let a = mol.push_atom(6);
        let b = mol.push_atom(6);
        mol.connect(a, b).unwrap();
        mol.set_property(a, "name", PropertyValue::String(name1.into()));
        mol.set_property(b, "name", PropertyValue::String(name2.into()));
        mol.set_property(a, "charge", PropertyValue::Double(-0.5));
        mol.set_property(b, "charge", PropertyValue::Double(1.0));
        mol
    }

    #[test]
    fn fragment_rendering() {
        let mol = ethane("CA", "CB");
        let product = Product::new(&mol, &mol, Config::no_opt(1)).unwrap();
        let fragment = Fragment::new(&product, &[NodeId::new(0)]).unwrap();
        let expected = "graph G {\n\toverlap=scale\n\
            \t0[style=\"filled,bold\",fillcolor=gray,label=\"0 (C)\"]\n\
            \t1[style=\"filled,dashed\",fillcolor=gray,label=\"1 (C)\"]\n\
            0 -- 1\n}\n";
        assert_eq!(fragment.to_dot(), expected);
        assert_eq!(fragment.molecule().id(Atom::new(1)), AtomId::new(1));
    }

    #[test]
    fn product_rendering_without_properties() {
        let mol = ethane("CA", "CB");
        let product = Product::new(&mol, &mol, Config::default()).unwrap();
        let dot = product.to_dot(&[]);
        assert!(dot.starts_with("graph G {\n\toverlap=scale\n\tlayout=neato\n\t0\n"));
        // (0,0)-(1,1) bonded in both, (0,1)-(1,0) too
        assert!(dot.contains("0 -- 3\n"));
        assert!(dot.ends_with("}\n"));
        assert!(!dot.contains("dashed"));
    }

    #[test]
    fn product_labels_use_shared_properties() {
        let m1 = ethane("CA", "CB");
        let mut m2 = ethane("X", "Y");
        m2.set_property(Atom::new(0), "only_here", PropertyValue::Int(3));
        let product = Product::new(&m1, &m2, Config::default()).unwrap();
        let dot = product.to_dot(&["charge", "only_here", "name"]);
        assert!(dot.contains("\t0[style=filled,fillcolor=gray,label=\"CA,X\\n-0.5,-0.5\"]\n"));
        assert!(dot.contains("\t1[style=filled,fillcolor=gray,label=\"CA,Y\\n-0.5,1\"]\n"));

        let mut out = Vec::new();
        product.write_dot(&mut out, &["name"]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("label=\"CB,Y\""));
    }
}
