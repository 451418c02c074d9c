//! Template data for every page
//!
//! Handlers fetch through [`SiteService`](super::SiteService) and hand the
//! results to the builders here. Every label is resolved through `t!` at
//! build time, so templates only ever print prepared strings.

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::config::SiteConfig;
use crate::content::{ContentCard, ContentPipeline, MediaBase, RenderPlan};
use crate::i18n::{current_locale, t};
use crate::models::{CarouselItem, Content, ImageBlock, ImportantLink, Page, Tag, Video};
use crate::navigation::{home_tag_href, page_href, tag_href, Breadcrumb, NavItem, PageTree};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Program slugs accepted by the registration form
pub const PROGRAMS: &[&str] = &[
    "civil_engineering",
    "mechanical_engineering",
    "it",
    "electrical_engineering",
];

fn program_label(slug: &str) -> String {
    match slug {
        "civil_engineering" => t!("site.programs.civil_engineering").to_string(),
        "mechanical_engineering" => t!("site.programs.mechanical_engineering").to_string(),
        "it" => t!("site.programs.it").to_string(),
        "electrical_engineering" => t!("site.programs.electrical_engineering").to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub address: String,
    pub phones: Vec<String>,
    pub email: String,
    pub map_embed_url: String,
}

impl ContactInfo {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            address: site.address.clone(),
            phones: site.phones.clone(),
            email: site.email.clone(),
            map_embed_url: site.map_embed_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutLabels {
    pub home: String,
    pub contents: String,
    pub contact: String,
    pub register: String,
    pub menu: String,
    pub links: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub follow: String,
    pub rights: String,
}

impl LayoutLabels {
    fn load() -> Self {
        Self {
            home: t!("site.nav.home").to_string(),
            contents: t!("site.nav.contents").to_string(),
            contact: t!("site.nav.contact").to_string(),
            register: t!("site.nav.register").to_string(),
            menu: t!("site.nav.menu").to_string(),
            links: t!("site.links.title").to_string(),
            address: t!("site.contact.address").to_string(),
            phone: t!("site.contact.phone").to_string(),
            email: t!("site.contact.email").to_string(),
            follow: t!("site.footer.follow").to_string(),
            rights: t!("site.footer.rights").to_string(),
        }
    }
}

/// Header, sidebar and footer shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct LayoutView {
    pub lang: String,
    pub site_name: String,
    pub title: String,
    pub nav: Vec<NavItem>,
    pub links: Vec<LinkView>,
    pub contact: ContactInfo,
    pub facebook_url: String,
    pub year: i32,
    pub labels: LayoutLabels,
}

impl LayoutView {
    /// Build the layout for a page titled `title`
    ///
    /// Falls back to the configured links when `urls/` returned nothing.
    pub fn new(
        site: &SiteConfig,
        tree: &PageTree,
        active_slug: Option<&str>,
        links: Vec<ImportantLink>,
        title: &str,
    ) -> Self {
        let links = if links.is_empty() {
            site.fallback_links
                .iter()
                .map(|link| LinkView {
                    title: link.title.clone(),
                    url: link.url.clone(),
                })
                .collect()
        } else {
            links
                .into_iter()
                .map(|link| LinkView {
                    title: link.title,
                    url: link.url,
                })
                .collect()
        };

        let title = if title.is_empty() || title == site.name {
            site.name.clone()
        } else {
            format!("{title} | {}", site.name)
        };

        Self {
            lang: current_locale(),
            site_name: site.name.clone(),
            title,
            nav: tree.nav_items(active_slug),
            links,
            contact: ContactInfo::from_site(site),
            facebook_url: site.facebook_url.clone(),
            year: chrono::Local::now().year(),
            labels: LayoutLabels::load(),
        }
    }
}

// ============================================================================
// Home
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideView {
    pub title: String,
    pub description: String,
    pub image: String,
}

impl SlideView {
    /// One slide per carousel item, showing its first image
    pub fn from_item(item: &CarouselItem, media: &MediaBase, fallback: &str) -> Self {
        let raw = item.images.first().and_then(ImageBlock::url);
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            image: media.resolve(raw, fallback),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntroCard {
    pub title: String,
    pub text: String,
}

fn intro_cards() -> Vec<IntroCard> {
    vec![
        IntroCard {
            title: t!("site.home.cards.about.title").to_string(),
            text: t!("site.home.cards.about.text").to_string(),
        },
        IntroCard {
            title: t!("site.home.cards.motto.title").to_string(),
            text: t!("site.home.cards.motto.text").to_string(),
        },
        IntroCard {
            title: t!("site.home.cards.goal.title").to_string(),
            text: t!("site.home.cards.goal.text").to_string(),
        },
    ]
}

/// Introduction video; `embed` is set for hosted players
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoView {
    pub id: i64,
    pub title: String,
    pub src: String,
    pub embed: Option<String>,
}

impl VideoView {
    /// Uploaded files win over the external URL
    pub fn from_video(video: &Video, media: &MediaBase) -> Self {
        let file = video
            .video_file
            .as_deref()
            .map(str::trim)
            .filter(|file| !file.is_empty());

        let src = match file {
            Some(file) => media.resolve(Some(file), ""),
            None => video.url.trim().to_string(),
        };

        Self {
            id: video.id,
            title: video.title.clone(),
            embed: embed_url(&src),
            src,
        }
    }
}

/// Player URL for YouTube, Vimeo and Facebook videos
pub fn embed_url(src: &str) -> Option<String> {
    let url = Url::parse(src).ok()?;
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);
    let path = url.path().trim_matches('/');

    match host {
        "youtube.com" => {
            if path.starts_with("embed/") {
                return Some(src.to_string());
            }
            let id = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .or_else(|| path.strip_prefix("shorts/").map(str::to_string))?;
            Some(format!("https://www.youtube.com/embed/{id}"))
        }
        "youtu.be" => (!path.is_empty()).then(|| format!("https://www.youtube.com/embed/{path}")),
        "player.vimeo.com" => Some(src.to_string()),
        "vimeo.com" => {
            let id = path.rsplit('/').next().filter(|id| {
                !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
            })?;
            Some(format!("https://player.vimeo.com/video/{id}"))
        }
        "facebook.com" | "fb.watch" => {
            let href: String = url::form_urlencoded::byte_serialize(src.as_bytes()).collect();
            Some(format!(
                "https://www.facebook.com/plugins/video.php?href={href}&show_text=false"
            ))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
    pub name: String,
    pub slug: String,
    pub href: String,
    pub selected: bool,
}

fn tag_chips(tags: &[Tag], selected: Option<&str>, href: impl Fn(&str) -> String) -> Vec<TagChip> {
    tags.iter()
        .map(|tag| TagChip {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            href: href(&tag.slug),
            selected: selected == Some(tag.slug.as_str()),
        })
        .collect()
}

/// Tag the home news carousel shows: `requested` if known, else the first
pub fn select_tag<'a>(tags: &'a [Tag], requested: Option<&str>) -> Option<&'a Tag> {
    requested
        .and_then(|slug| tags.iter().find(|tag| tag.slug == slug))
        .or_else(|| tags.first())
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeLabels {
    pub intro: String,
    pub news: String,
    pub see_all: String,
    pub videos: String,
    pub no_news: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub slides: Vec<SlideView>,
    pub carousel_error: Option<String>,
    pub intro_cards: Vec<IntroCard>,
    pub videos: Vec<VideoView>,
    pub programs: Vec<String>,
    pub tags: Vec<TagChip>,
    pub news: Vec<ContentCard>,
    pub see_all_href: Option<String>,
    pub labels: HomeLabels,
}

impl HomeView {
    /// `carousel` is `None` when the carousel fetch failed
    pub fn new(
        pipeline: &ContentPipeline,
        carousel: Option<&[CarouselItem]>,
        videos: &[Video],
        tags: &[Tag],
        selected: Option<&Tag>,
        news: Vec<ContentCard>,
    ) -> Self {
        let slides = carousel
            .unwrap_or_default()
            .iter()
            .map(|item| SlideView::from_item(item, pipeline.media(), pipeline.banner_image()))
            .collect();

        let read_more = t!("site.home.read_more").to_string();
        let news = news
            .into_iter()
            .map(|mut card| {
                if card.description.is_empty() {
                    card.description = read_more.clone();
                }
                card
            })
            .collect();

        let selected_slug = selected.map(|tag| tag.slug.as_str());

        Self {
            slides,
            carousel_error: carousel
                .is_none()
                .then(|| t!("site.home.carousel_unavailable").to_string()),
            intro_cards: intro_cards(),
            videos: videos
                .iter()
                .map(|video| VideoView::from_video(video, pipeline.media()))
                .collect(),
            programs: PROGRAMS.iter().map(|slug| program_label(slug)).collect(),
            tags: tag_chips(tags, selected_slug, home_tag_href),
            news,
            see_all_href: selected_slug.map(tag_href),
            labels: HomeLabels {
                intro: t!("site.home.intro").to_string(),
                news: t!("site.home.news").to_string(),
                see_all: t!("site.home.see_all").to_string(),
                videos: t!("site.home.videos").to_string(),
                no_news: t!("site.home.no_news").to_string(),
            },
        }
    }
}

// ============================================================================
// Contents
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ContentListView {
    pub title: String,
    pub tags: Vec<TagChip>,
    pub cards: Vec<ContentCard>,
    pub empty_message: Option<String>,
}

impl ContentListView {
    pub fn new(tags: &[Tag], selected: &str, cards: Vec<ContentCard>) -> Self {
        let title = tags
            .iter()
            .find(|tag| tag.slug == selected)
            .map(|tag| tag.name.clone())
            .unwrap_or_else(|| t!("site.contents.title").to_string());

        Self {
            title,
            tags: tag_chips(tags, Some(selected), tag_href),
            empty_message: cards
                .is_empty()
                .then(|| t!("site.contents.empty").to_string()),
            cards,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentDetailView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Vec<TagChip>,
    pub plan: RenderPlan,
    pub tags_label: String,
    pub image_unavailable: String,
}

impl ContentDetailView {
    pub fn new(pipeline: &ContentPipeline, content: &Content) -> Self {
        Self {
            id: content.id,
            title: content.title.clone(),
            description: pipeline.render_html(&content.description),
            tags: tag_chips(&content.tags, None, tag_href),
            plan: pipeline.detail(content),
            tags_label: t!("site.content.tags").to_string(),
            image_unavailable: t!("site.page.image_unavailable").to_string(),
        }
    }
}

// ============================================================================
// Static pages
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub id: i64,
    pub title: String,
    pub plan: RenderPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub sections: Vec<SectionView>,
    pub children: Vec<Breadcrumb>,
    pub empty_message: Option<String>,
    pub children_label: String,
    pub image_unavailable: String,
}

impl PageView {
    pub fn new(pipeline: &ContentPipeline, page: &Page, tree: &PageTree) -> Self {
        let sections: Vec<SectionView> = page
            .contents
            .iter()
            .map(|content| SectionView {
                id: content.id,
                title: content.title.clone(),
                plan: pipeline.section(content),
            })
            .collect();

        let children = page
            .children
            .iter()
            .map(|child| Breadcrumb {
                label: child.title.clone(),
                href: page_href(&child.slug),
            })
            .collect();

        let empty = sections.iter().all(|section| section.plan.is_empty());

        Self {
            title: page.title.clone(),
            subtitle: page.subtitle.clone(),
            description: pipeline.render_html(&page.description),
            breadcrumbs: tree.breadcrumbs(&page.slug),
            sections,
            children,
            empty_message: empty.then(|| t!("site.page.empty").to_string()),
            children_label: t!("site.page.children").to_string(),
            image_unavailable: t!("site.page.image_unavailable").to_string(),
        }
    }
}

// ============================================================================
// Contact and registration
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ContactView {
    pub title: String,
    pub contact: ContactInfo,
}

impl ContactView {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            title: t!("site.contact.title").to_string(),
            contact: ContactInfo::from_site(site),
        }
    }
}

/// Submitted registration fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub program: String,
}

impl RegistrationForm {
    /// Localized messages for every invalid field, empty when valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(t!("site.register.errors.name").to_string());
        }
        if !EMAIL_REGEX.is_match(self.email.trim()) {
            errors.push(t!("site.register.errors.email").to_string());
        }
        if !PROGRAMS.contains(&self.program.as_str()) {
            errors.push(t!("site.register.errors.program").to_string());
        }

        errors
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationLabels {
    pub title: String,
    pub name: String,
    pub email: String,
    pub program: String,
    pub select: String,
    pub submit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationView {
    pub form: RegistrationForm,
    pub programs: Vec<ProgramOption>,
    pub errors: Vec<String>,
    pub success: Option<String>,
    pub labels: RegistrationLabels,
}

impl RegistrationView {
    /// Blank form
    pub fn empty() -> Self {
        Self::build(RegistrationForm::default(), Vec::new(), None)
    }

    /// Form after a submission; a valid one is acknowledged and cleared
    pub fn submitted(form: RegistrationForm) -> Self {
        let errors = form.validate();
        if errors.is_empty() {
            Self::build(
                RegistrationForm::default(),
                errors,
                Some(t!("site.register.success").to_string()),
            )
        } else {
            Self::build(form, errors, None)
        }
    }

    fn build(form: RegistrationForm, errors: Vec<String>, success: Option<String>) -> Self {
        let programs = PROGRAMS
            .iter()
            .map(|slug| ProgramOption {
                value: slug.to_string(),
                label: program_label(slug),
                selected: form.program == *slug,
            })
            .collect();

        Self {
            form,
            programs,
            errors,
            success,
            labels: RegistrationLabels {
                title: t!("site.register.title").to_string(),
                name: t!("site.register.name").to_string(),
                email: t!("site.register.email").to_string(),
                program: t!("site.register.program").to_string(),
                select: t!("site.register.select").to_string(),
                submit: t!("site.register.submit").to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.success.is_some()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub back_home: String,
}

impl ErrorView {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            title: t!("site.error.title").to_string(),
            message: message.into(),
            back_home: t!("site.error.back_home").to_string(),
        }
    }
}
