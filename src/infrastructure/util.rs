use crate::application::ports::util::SlugGenerator;
use crate::domain::post::generate_slug;

#[derive(Default, Clone)]
pub struct DefaultSlugGenerator;

impl SlugGenerator for DefaultSlugGenerator {
    fn slugify(&self, input: &str) -> String {
        generate_slug(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegates_to_domain_normalizer() {
        assert_eq!(DefaultSlugGenerator.slugify("My First Post"), "my-first-post");
    }
}
