use crate::template::Template;

/// A collection of templates compiled into a single source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Name used in the generated package clause.
    pub name: String,
    pub templates: Vec<Template>,
}

impl Package {
    pub fn new(name: impl Into<String>, templates: Vec<Template>) -> Self {
        Package {
            name: name.into(),
            templates,
        }
    }

    /// Normalize every template in the package.
    pub fn normalize(&mut self) {
        for template in &mut self.templates {
            template.normalize();
        }
    }
}
