/// What a call to [`Registry::add`](crate::Registry::add) registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target<E> {
    /// Discover elements through the host. The selector is remembered so
    /// `refresh` can discover again, and it doubles as the logical name of
    /// every element it finds.
    BySelector(String),
    /// A single element, optionally named.
    ByElement(E, Option<String>),
    /// Several elements sharing one optional name.
    ByElements(Vec<E>, Option<String>),
}

impl<E> Target<E> {
    pub fn selector(selector: impl Into<String>) -> Self {
        Target::BySelector(selector.into())
    }

    pub fn element(element: E) -> Self {
        Target::ByElement(element, None)
    }

    pub fn named(element: E, name: impl Into<String>) -> Self {
        Target::ByElement(element, Some(name.into()))
    }

    pub fn elements(elements: impl IntoIterator<Item = E>) -> Self {
        Target::ByElements(elements.into_iter().collect(), None)
    }

    pub fn elements_named(elements: impl IntoIterator<Item = E>, name: impl Into<String>) -> Self {
        Target::ByElements(elements.into_iter().collect(), Some(name.into()))
    }
}

impl<E> From<&str> for Target<E> {
    fn from(selector: &str) -> Self {
        Target::selector(selector)
    }
}

impl<E> From<String> for Target<E> {
    fn from(selector: String) -> Self {
        Target::BySelector(selector)
    }
}

impl<E> From<Vec<E>> for Target<E> {
    fn from(elements: Vec<E>) -> Self {
        Target::ByElements(elements, None)
    }
}
