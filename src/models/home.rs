use serde::{Deserialize, Serialize};

use super::news::{News, Promotion};
use super::reference::PortalCounts;
use super::students::StudentDetails;
use super::teachers::{TeacherDetails, TeacherDisciplineDetails};

pub const LATEST_NEWS_ON_INDEX: usize = 3;
pub const PROMOTIONS_ON_INDEX: usize = 2;

#[derive(Debug, Serialize)]
pub struct HomeIndex {
    pub counts: PortalCounts,
    pub latest_news: Vec<News>,
    pub active_promotions: Vec<Promotion>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_string: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> Option<&str> {
        self.search_string
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub search_string: String,
    pub news: Vec<News>,
    pub promotions: Vec<Promotion>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub display_name: String,
    pub counts: PortalCounts,
    pub pending_requests: usize,
}

#[derive(Debug, Serialize)]
pub struct TeacherDashboard {
    pub teacher: TeacherDetails,
    pub disciplines: Vec<TeacherDisciplineDetails>,
    pub material_count: usize,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub student: StudentDetails,
    pub material_count: usize,
}
