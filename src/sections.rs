use serde::Serialize;

/// The page's content sections, in scroll order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SectionId {
    #[serde(rename = "section1")]
    About,
    #[serde(rename = "section2")]
    Experience,
    #[serde(rename = "section3")]
    Education,
    #[serde(rename = "section4")]
    Projects,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [
        Self::About,
        Self::Experience,
        Self::Education,
        Self::Projects,
    ];

    pub fn first() -> Self {
        Self::ALL[0]
    }

    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    pub fn dom_id(self) -> &'static str {
        match self {
            Self::About => "section1",
            Self::Experience => "section2",
            Self::Education => "section3",
            Self::Projects => "section4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::About => "About Me",
            Self::Experience => "Experiences",
            Self::Education => "Education",
            Self::Projects => "Projects",
        }
    }
}

/// A section's top edge relative to the viewport for one tick. `top` is
/// `None` while the element is not mounted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionTop {
    pub id: SectionId,
    pub top: Option<f64>,
}

impl SectionTop {
    pub fn mounted(id: SectionId, top: f64) -> Self {
        Self { id, top: Some(top) }
    }

    pub fn unmounted(id: SectionId) -> Self {
        Self { id, top: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_ids_follow_page_order() {
        let ids: Vec<&str> = SectionId::ALL.iter().map(|id| id.dom_id()).collect();
        assert_eq!(ids, ["section1", "section2", "section3", "section4"]);
        assert_eq!(SectionId::first(), SectionId::About);
        assert_eq!(SectionId::last(), SectionId::Projects);
    }

    #[test]
    fn serializes_as_dom_id() {
        for id in SectionId::ALL {
            assert_eq!(serde_json::to_value(id).expect("serializable"), id.dom_id());
        }
    }
}
