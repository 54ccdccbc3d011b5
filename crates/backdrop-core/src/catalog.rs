//! Search and category filtering over the project showcase.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    All,
    Web,
    Mobile,
    Desktop,
    Bots,
    Extension,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Category::All),
            "web" => Some(Category::Web),
            "mobile" => Some(Category::Mobile),
            "desktop" => Some(Category::Desktop),
            "bots" => Some(Category::Bots),
            "extension" => Some(Category::Extension),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Web => "web",
            Category::Mobile => "mobile",
            Category::Desktop => "desktop",
            Category::Bots => "bots",
            Category::Extension => "extension",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Development,
    Archived,
    Released,
}

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "development" => Some(Status::Development),
            "archived" => Some(Status::Archived),
            "released" => Some(Status::Released),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub blurb: String,
    pub tags: Vec<String>,
    pub stack: Vec<String>,
    pub categories: Vec<Category>,
    pub status: Status,
}

pub fn matches(project: &Project, query: &str, category: Category) -> bool {
    let in_category = category == Category::All || project.categories.contains(&category);
    if !in_category {
        return false;
    }
    let q = query.trim().to_lowercase();
    let has = |s: &str| s.to_lowercase().contains(&q);
    has(&project.title)
        || has(&project.blurb)
        || project
            .tags
            .iter()
            .any(|t| has(t) || format!("#{t}").to_lowercase().contains(&q))
        || project.stack.iter().any(|s| has(s))
}

/// Visible projects in catalog order.
pub fn filter<'a>(projects: &'a [Project], query: &str, category: Category) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| matches(p, query, category))
        .collect()
}

/// Sections in display order; empty sections are dropped.
pub fn group_by_status<'a>(projects: &[&'a Project]) -> Vec<(Status, Vec<&'a Project>)> {
    [Status::Released, Status::Development, Status::Archived]
        .into_iter()
        .map(|status| {
            let items = projects
                .iter()
                .copied()
                .filter(|p| p.status == status)
                .collect::<Vec<_>>();
            (status, items)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect()
}

/// Search box text plus category selector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub query: String,
    pub category: Category,
}

impl FilterState {
    /// Clicking a badge toggles it: a second click on the active category or
    /// query clears it. Category badges select the category; any other badge
    /// becomes the search text.
    pub fn badge_click(&mut self, label: &str) {
        if label.is_empty() {
            return;
        }
        if label == self.category.as_str() {
            self.category = Category::All;
        } else if label == self.query {
            self.query.clear();
        } else {
            match Category::parse(label) {
                // Extension badges search rather than filter.
                Some(c) if c != Category::Extension => self.category = c,
                _ => self.query = label.to_string(),
            }
        }
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        filter(projects, &self.query, self.category)
    }
}
