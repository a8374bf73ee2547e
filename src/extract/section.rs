//! Per-section extraction strategies
//!
//! The site serves articles from several sub-sites, each with its own page
//! template. A [`Section`] is classified once from the article's redirect
//! target and picks exactly one [`SectionExtractor`] from the
//! [`ExtractorRegistry`].

use crate::extract::dom::{element_at, elements_by_tag, elements_by_tag_and_class, remove_by_tag};
use crate::extract::rewrite::RewriteRules;
use ego_tree::NodeId;
use scraper::Html;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Sub-site an article is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Opinion,
    Vision,
    Money,
    Main,
}

impl Section {
    /// Classifies a redirect target by its host labels
    ///
    /// Anything unrecognized, including an unparseable target, is `Main`.
    pub fn classify(target: &str) -> Self {
        let host = match Url::parse(target) {
            Ok(url) => url.host_str().unwrap_or_default().to_ascii_lowercase(),
            Err(_) => return Self::Main,
        };
        let has_label = |label: &str| host.split('.').any(|part| part == label);

        if has_label("opinion") {
            Self::Opinion
        } else if has_label("vision") {
            Self::Vision
        } else if has_label("money") {
            Self::Money
        } else {
            Self::Main
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opinion => "opinion",
            Self::Vision => "vision",
            Self::Money => "money",
            Self::Main => "main",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("node {node:?} no longer resolves to an element")]
pub struct RenderError {
    pub node: NodeId,
}

/// The container element holding an article body
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

/// One page template's extraction strategy
pub trait SectionExtractor: Send + Sync {
    fn section(&self) -> Section;

    /// Strips boilerplate and returns the body nodes in document order
    fn select_nodes(&self, document: &mut Html) -> Vec<NodeId>;

    /// Renders one selected node to a markdown fragment
    fn render_node(
        &self,
        document: &Html,
        node: NodeId,
        rules: &RewriteRules,
    ) -> Result<String, RenderError> {
        let element = element_at(document, node).ok_or(RenderError { node })?;
        Ok(rules.apply(&element.html()))
    }

    /// Final pass over the joined body
    fn post_process(&self, body: String) -> String {
        body
    }
}

/// Finds every `region`, detaches `stripped` tags inside it, then collects
/// the `walked` tags that remain
fn select_in_regions(
    document: &mut Html,
    region: Region,
    stripped: &[&str],
    walked: &[&str],
) -> Vec<NodeId> {
    let root = document.root_element();
    let regions: Vec<NodeId> = match region.class {
        Some(class) => elements_by_tag_and_class(root, region.tag, class),
        None => elements_by_tag(root, &[region.tag]),
    }
    .into_iter()
    .map(|element| element.id())
    .collect();

    for &id in &regions {
        for tag in stripped {
            remove_by_tag(document, id, tag);
        }
    }

    regions
        .iter()
        .filter_map(|&id| element_at(document, id))
        .flat_map(|region| elements_by_tag(region, walked))
        .map(|element| element.id())
        .collect()
}

/// opinion.udn.com columns
#[derive(Debug, Default)]
pub struct OpinionExtractor;

impl SectionExtractor for OpinionExtractor {
    fn section(&self) -> Section {
        Section::Opinion
    }

    fn select_nodes(&self, document: &mut Html) -> Vec<NodeId> {
        let region = Region {
            tag: "main",
            class: None,
        };
        select_in_regions(document, region, &["div", "h1"], &["p"])
    }
}

/// vision.udn.com long-form features, with sub-headings
#[derive(Debug, Default)]
pub struct VisionExtractor;

impl SectionExtractor for VisionExtractor {
    fn section(&self) -> Section {
        Section::Vision
    }

    fn select_nodes(&self, document: &mut Html) -> Vec<NodeId> {
        let region = Region {
            tag: "article",
            class: Some("story_article"),
        };
        select_in_regions(
            document,
            region,
            &["div", "h1", "figure", "blockquote"],
            &["h2", "p"],
        )
    }

    fn render_node(
        &self,
        document: &Html,
        node: NodeId,
        rules: &RewriteRules,
    ) -> Result<String, RenderError> {
        let element = element_at(document, node).ok_or(RenderError { node })?;
        if element.value().name() == "h2" {
            let heading = element.text().collect::<String>();
            let heading = heading.trim();
            if heading.is_empty() {
                return Ok(String::new());
            }
            return Ok(rules.apply(&format!("## {}", heading)));
        }
        Ok(rules.apply(&element.html()))
    }

    /// Puts a blank line before each sub-heading
    fn post_process(&self, body: String) -> String {
        body.replace("  \n## ", "  \n\n## ")
    }
}

/// money.udn.com business news
#[derive(Debug, Default)]
pub struct MoneyExtractor;

impl SectionExtractor for MoneyExtractor {
    fn section(&self) -> Section {
        Section::Money
    }

    fn select_nodes(&self, document: &mut Html) -> Vec<NodeId> {
        let region = Region {
            tag: "section",
            class: Some("article-content__editor"),
        };
        select_in_regions(document, region, &["div"], &["p"])
    }
}

/// The main udn.com news template
#[derive(Debug, Default)]
pub struct MainExtractor;

impl SectionExtractor for MainExtractor {
    fn section(&self) -> Section {
        Section::Main
    }

    fn select_nodes(&self, document: &mut Html) -> Vec<NodeId> {
        let region = Region {
            tag: "section",
            class: Some("article-content__editor"),
        };
        select_in_regions(document, region, &["div"], &["p"])
    }
}

/// Extraction strategies keyed by section
pub struct ExtractorRegistry {
    extractors: HashMap<Section, Box<dyn SectionExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registers `extractor` for its section, replacing any previous one
    pub fn register(&mut self, extractor: Box<dyn SectionExtractor>) {
        self.extractors.insert(extractor.section(), extractor);
    }

    pub fn get(&self, section: Section) -> Option<&dyn SectionExtractor> {
        self.extractors.get(&section).map(|extractor| extractor.as_ref())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(OpinionExtractor));
        registry.register(Box::new(VisionExtractor));
        registry.register(Box::new(MoneyExtractor));
        registry.register(Box::new(MainExtractor));
        registry
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections: Vec<&str> = self.extractors.keys().map(Section::as_str).collect();
        sections.sort_unstable();
        f.debug_struct("ExtractorRegistry")
            .field("sections", &sections)
            .finish()
    }
}
