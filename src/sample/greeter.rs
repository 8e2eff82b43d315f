/// A service shared by every group, bound once in the injector.
#[derive(Debug, Clone)]
pub struct Greeter {
    salutation: String,
}

impl Greeter {
    pub fn new(salutation: impl Into<String>) -> Self {
        Self {
            salutation: salutation.into(),
        }
    }

    pub fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.salutation, name)
    }
}

impl Default for Greeter {
    fn default() -> Self {
        Self::new("Hello")
    }
}
