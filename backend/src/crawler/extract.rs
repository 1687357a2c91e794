//! Field extraction from listing and detail pages.
//!
//! Everything here works on HTML text; fetching lives in the parent module.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{CrawlError, CrawlResult};
use crate::models::RawListing;

/// Placeholder the site data uses for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Headings of aggregate listings that are not single properties.
const SKIPPED_HEADINGS: [&str; 2] = ["Project", "Borey"];

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("Invalid regex"));

static NON_PRINTABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x20-\x7E]+").expect("Invalid regex"));

fn selector(css: &str) -> CrawlResult<Selector> {
    Selector::parse(css).map_err(|_| CrawlError::Selector(css.to_string()))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(text_of)
}

/// True for `DD/MM/YYYY`.
pub fn is_listing_date(text: &str) -> bool {
    DATE_RE.is_match(text)
}

// =============================================================================
// Listing pages
// =============================================================================

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingStub {
    pub heading: String,
    pub listed_date: String,
    pub updated_date: String,
    /// Link to the detail page as found in the markup
    pub detail_href: Option<String>,
}

/// Parse a listing page.
///
/// Returns `None` when the page has no item containers, which marks the
/// end of the pagination. Project and Borey entries are dropped.
pub fn parse_list_page(html: &str) -> CrawlResult<Option<Vec<ListingStub>>> {
    let document = Html::parse_document(html);
    let container_sel = selector("div.items-container")?;
    let item_sel = selector("div.item")?;
    let heading_sel = selector("div.heading")?;
    let date_sel = selector("span.normal-span")?;
    let link_sel = selector("a[href]")?;

    let containers: Vec<ElementRef<'_>> = document.select(&container_sel).collect();
    if containers.is_empty() {
        return Ok(None);
    }

    let mut stubs = Vec::new();
    for container in containers {
        for item in container.select(&item_sel) {
            let Some(heading) = item.select(&heading_sel).next() else {
                continue;
            };

            // Only the heading's own text; nested price/address blocks are ignored.
            let mut own = String::new();
            for child in heading.children() {
                if let Some(text) = child.value().as_text() {
                    own.push_str(text);
                }
            }
            let heading = own.trim().to_string();
            if SKIPPED_HEADINGS.contains(&heading.as_str()) {
                continue;
            }

            let dates: Vec<String> = item.select(&date_sel).take(2).map(text_of).collect();
            let [listed, updated] = dates.as_slice() else {
                continue;
            };

            stubs.push(ListingStub {
                heading,
                listed_date: listed.replace("Listed : ", "").trim().to_string(),
                updated_date: updated.replace("Updated: ", "").trim().to_string(),
                detail_href: item
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(String::from),
            });
        }
    }

    Ok(Some(stubs))
}

// =============================================================================
// Detail pages
// =============================================================================

/// Where the location text of a detail page comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// Plain heading text
    Text(String),
    /// Heading links to a location page holding the full text
    Link(String),
    Missing,
}

/// Fields read from a detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub property_id: String,
    pub property_name: String,
    pub property_types: String,
    pub location: LocationSource,
    pub bedrooms: String,
    pub bathrooms: String,
    pub land_area: String,
    pub floor_area: String,
    pub floor_level: String,
    pub facing: String,
    pub completion_year: String,
    pub price: String,
    pub amenities: Vec<String>,
}

pub fn parse_detail_page(html: &str) -> CrawlResult<DetailPage> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let na = || NOT_AVAILABLE.to_string();

    let property_name = first_text(root, &selector("h1.headline.alone")?).unwrap_or_else(na);

    let location = match root.select(&selector("div.sections")?).next() {
        Some(sections) => match sections.select(&selector("h2")?).next() {
            Some(h2) => match h2
                .select(&selector("a[href]")?)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                Some(href) => LocationSource::Link(href.to_string()),
                None => LocationSource::Text(text_of(h2)),
            },
            None => LocationSource::Missing,
        },
        None => LocationSource::Missing,
    };

    let value_sel = selector("span.value")?;
    let property_types = root
        .select(&selector("div.icon-container")?)
        .next()
        .and_then(|icon| {
            icon.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "div")
        })
        .and_then(|unit| first_text(unit, &value_sel))
        .unwrap_or_else(na);

    let mut page = DetailPage {
        property_id: na(),
        property_name,
        property_types,
        location,
        bedrooms: na(),
        bathrooms: na(),
        land_area: na(),
        floor_area: na(),
        floor_level: na(),
        facing: na(),
        completion_year: na(),
        price: na(),
        amenities: Vec::new(),
    };

    let label_sel = selector("span.text")?;
    if let Some(grid) = root.select(&selector("div.css-r7o7s2.elr7wbp0")?).next() {
        for feature in grid.select(&selector("div")?) {
            let value = first_text(feature, &value_sel).unwrap_or_else(na);
            let label = first_text(feature, &label_sel).unwrap_or_else(na);
            let slot = if label.contains("Bedroom") {
                &mut page.bedrooms
            } else if label.contains("Bathroom") {
                &mut page.bathrooms
            } else if label.contains("Land Area") {
                &mut page.land_area
            } else if label.contains("Floor Area") {
                &mut page.floor_area
            } else if label.contains("Floor Level") {
                &mut page.floor_level
            } else if label.contains("Facing") {
                &mut page.facing
            } else if label.contains("Completion Year") {
                &mut page.completion_year
            } else {
                continue;
            };
            *slot = value;
        }
    }

    page.price = first_text(root, &selector("div.actual-price")?)
        .or(first_text(root, &selector("span.price-value")?))
        .unwrap_or_else(na);

    let span_sel = selector("span")?;
    if let Some(id_label) = root
        .select(&span_sel)
        .find(|s| s.text().collect::<String>().contains("Property ID"))
    {
        if let Some(id_value) = id_label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "span" && e.value().classes().any(|c| c == "value"))
        {
            page.property_id = text_of(id_value);
        }
    }

    let h2_sel = selector("h2")?;
    let highlighted_sel = selector("div.highlighted")?;
    for block in root.select(&selector("div.features-block")?) {
        if !block.select(&h2_sel).any(|h2| text_of(h2) == "Amenities") {
            continue;
        }
        for highlighted in block.select(&highlighted_sel) {
            let spans = highlighted
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "span");
            page.amenities.extend(spans.filter_map(|s| clean_amenity(&text_of(s))));
        }
    }

    Ok(page)
}

/// Location heading of a linked location page, with line breaks and
/// double spaces removed.
pub fn parse_location_page(html: &str) -> CrawlResult<Option<String>> {
    let document = Html::parse_document(html);
    let h2_sel = selector("h2")?;
    let h2 = document
        .select(&selector("div.sections")?)
        .next()
        .and_then(|sections| sections.select(&h2_sel).next());

    Ok(h2.map(|h2| text_of(h2).replace('\n', "").replace("  ", "")))
}

/// Strip icon glyphs and other non-printable characters.
pub fn clean_amenity(raw: &str) -> Option<String> {
    let cleaned = NON_PRINTABLE_RE.replace_all(raw, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// `(commune, district, city)` from a location line.
///
/// Four-part lines lead with a street and drop it.
pub fn split_location(location: &str) -> (String, String, String) {
    if location == NOT_AVAILABLE {
        return (NOT_AVAILABLE.into(), NOT_AVAILABLE.into(), NOT_AVAILABLE.into());
    }

    let mut parts: Vec<&str> = location.split(", ").collect();
    if parts.len() == 4 {
        parts.remove(0);
    }
    let part = |i: usize| parts.get(i).copied().unwrap_or(NOT_AVAILABLE).to_string();
    (part(0), part(1), part(2))
}

/// `None` for the placeholder and for empty text.
fn present(value: String) -> Option<String> {
    (!value.is_empty() && value != NOT_AVAILABLE).then_some(value)
}

impl DetailPage {
    /// Combine with the listing-page fields into a raw record.
    ///
    /// `N/A` placeholders become empty cells in the listings CSV.
    pub fn into_listing(self, stub: &ListingStub, location_text: String) -> RawListing {
        let (commune, district, city) = split_location(&location_text);

        RawListing {
            property_id: present(self.property_id),
            property_name: present(self.property_name),
            property_types: present(self.property_types),
            floor_level: present(self.floor_level),
            completion_year: present(self.completion_year),
            facing: present(self.facing),
            address: present(location_text),
            commune: present(commune),
            district: present(district),
            city: present(city),
            listed_date: present(stub.listed_date.clone()),
            updated_date: present(stub.updated_date.clone()),
            land_area: present(self.land_area),
            floor_area: present(self.floor_area),
            bedrooms: present(self.bedrooms),
            bathrooms: present(self.bathrooms),
            price: present(self.price),
            amenities: present(self.amenities.join(", ")),
        }
    }
}
