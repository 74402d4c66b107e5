use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub signing_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }
}
