//! Transform pipeline.
//!
//! A [`Pipeline`] parses markup, runs tree transforms in registration order,
//! and then either writes the tree back to markup or projects it to HTML and
//! runs HTML transforms.

use crate::ast::Node;
use crate::html::{self, HtmlNode};
use crate::markup;
use crate::parser::Parser;
use crate::warning::Warning;

/// A stage operating on the markup tree.
pub trait TreeTransform: Send {
    /// Stage name used in logs.
    fn name(&self) -> &str;

    fn transform(&mut self, tree: &mut Node, warnings: &mut Vec<Warning>);
}

/// A stage operating on the HTML tree.
pub trait HtmlTransform: Send {
    /// Stage name used in logs.
    fn name(&self) -> &str;

    fn transform(&mut self, tree: &mut HtmlNode, warnings: &mut Vec<Warning>);
}

/// Output of a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML or markup text.
    pub output: String,
    /// Recoverable problems, in the order they were found.
    pub warnings: Vec<Warning>,
}

/// Ordered processing stages.
///
/// # Example
///
/// ```
/// use pressmark_renderer::{DirectiveResolver, GenericContainer, Pipeline, ResolveMode};
///
/// let mut pipeline = Pipeline::new().with_tree_stage(
///     DirectiveResolver::new(ResolveMode::Hint).with_container(GenericContainer::div()),
/// );
/// let result = pipeline.render_html(":::div{.note}\nHello\n:::");
/// assert_eq!(result.output, "<div class=\"note\">\n<p>Hello</p>\n</div>");
/// ```
#[derive(Default)]
pub struct Pipeline {
    parser: Parser,
    tree_stages: Vec<Box<dyn TreeTransform>>,
    html_stages: Vec<Box<dyn HtmlTransform>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// Append a tree stage.
    #[must_use]
    pub fn with_tree_stage<T: TreeTransform + 'static>(mut self, stage: T) -> Self {
        self.tree_stages.push(Box::new(stage));
        self
    }

    /// Append an HTML stage.
    #[must_use]
    pub fn with_html_stage<T: HtmlTransform + 'static>(mut self, stage: T) -> Self {
        self.html_stages.push(Box::new(stage));
        self
    }

    /// Names of all stages in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.tree_stages
            .iter()
            .map(|stage| stage.name())
            .chain(self.html_stages.iter().map(|stage| stage.name()))
    }

    /// Parse `source` and run all tree stages.
    pub fn run_tree(&mut self, source: &str) -> (Node, Vec<Warning>) {
        let parsed = self.parser.parse(source);
        let mut tree = parsed.tree;
        let mut warnings = parsed.warnings;

        for stage in &mut self.tree_stages {
            let before = warnings.len();
            stage.transform(&mut tree, &mut warnings);
            tracing::debug!(
                stage = stage.name(),
                new_warnings = warnings.len() - before,
                "Tree stage complete"
            );
        }

        (tree, warnings)
    }

    /// Run the pipeline and write the result as HTML.
    pub fn render_html(&mut self, source: &str) -> RenderResult {
        let (tree, mut warnings) = self.run_tree(source);
        let mut html = html::project(&tree);

        for stage in &mut self.html_stages {
            let before = warnings.len();
            stage.transform(&mut html, &mut warnings);
            tracing::debug!(
                stage = stage.name(),
                new_warnings = warnings.len() - before,
                "HTML stage complete"
            );
        }

        RenderResult {
            output: html.to_html(),
            warnings,
        }
    }

    /// Run the tree stages and write the result back as markup.
    pub fn render_markup(&mut self, source: &str) -> RenderResult {
        let (tree, mut warnings) = self.run_tree(source);
        let serialized = markup::serialize(&tree);
        warnings.extend(serialized.warnings);
        RenderResult {
            output: serialized.text,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::FigureTransform;
    use pretty_assertions::assert_eq;

    struct Shout;

    impl TreeTransform for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn transform(&mut self, tree: &mut Node, _warnings: &mut Vec<Warning>) {
            fn visit(node: &mut Node) {
                if let Node::Text { value } = node {
                    *value = value.to_uppercase();
                }
                if let Some(children) = node.children_mut() {
                    children.iter_mut().for_each(visit);
                }
            }
            visit(tree);
        }
    }

    #[test]
    fn test_empty_pipeline_renders_markup_html() {
        let result = Pipeline::new().render_html("*a*");
        assert_eq!(result.output, "<p><em>a</em></p>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut pipeline = Pipeline::new()
            .with_tree_stage(Shout)
            .with_html_stage(FigureTransform);
        assert_eq!(pipeline.stage_names().collect::<Vec<_>>(), vec!["shout", "figure"]);
        assert_eq!(pipeline.render_html("hi").output, "<p>HI</p>");
    }

    #[test]
    fn test_render_markup() {
        let result = Pipeline::new().with_tree_stage(Shout).render_markup("# hi");
        assert_eq!(result.output, "# HI\n");
    }

    #[test]
    fn test_parse_warnings_are_kept() {
        let result = Pipeline::new().render_html(":::div{.x}\nbody");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_hard_line_breaks_parser() {
        let mut pipeline = Pipeline::new().with_parser(Parser::new().with_hard_line_breaks(true));
        assert_eq!(pipeline.render_html("a\nb").output, "<p>a<br>\nb</p>");
    }
}
