//! Plain-text rendering of the listing page.

use std::io::{self, Write};

use shared::protocol::Product;
use storefront_core::{FilterState, Navigator, PageView};

pub const LOADING_MESSAGE: &str = "상품을 불러오는 중...";

#[derive(Default)]
pub struct TerminalView;

fn emit(text: &str) {
    let mut out = io::stdout().lock();
    // stdout closed (e.g. piped into `head`): nothing left to render to.
    let _ = writeln!(out, "{text}");
}

pub fn format_price(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return "-".to_string();
    }
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}원")
}

pub fn format_card(index: usize, product: &Product) -> String {
    let mall = if product.mall_name.is_empty() {
        String::new()
    } else {
        format!(" · {}", product.mall_name)
    };
    format!(
        "{:>4}. [{}] {} {}{}",
        index + 1,
        product.product_id,
        product.title,
        format_price(&product.lprice),
        mall
    )
}

pub fn format_filter_panel(state: &FilterState) -> String {
    let filters = &state.filters;
    let category1 = if filters.category1.is_empty() {
        "전체"
    } else {
        filters.category1.as_str()
    };
    let category2 = if filters.category2.is_empty() {
        "-"
    } else {
        filters.category2.as_str()
    };
    let mut lines = vec![format!(
        "검색: \"{}\" | 카테고리: {} > {} | 정렬: {} | 개수: {}",
        filters.search,
        category1,
        category2,
        filters.sort,
        filters.limit,
    )];

    if state.loading_categories {
        lines.push("카테고리 로딩 중...".to_string());
    } else if filters.category1.is_empty() {
        let names: Vec<&str> = state.categories.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("1depth: {}", names.join(" | ")));
    } else if let Some(selected) = state
        .categories
        .iter()
        .find(|c| c.name == filters.category1)
    {
        lines.push(format!("2depth: {}", selected.children.join(" | ")));
    }

    lines.join("\n")
}

impl PageView for TerminalView {
    fn render_shell(&self, skeleton_count: usize) {
        emit("==================== 쇼핑몰 ====================");
        for _ in 0..skeleton_count {
            emit("  ░░░░░░░░░░░░░░░░░░░░");
        }
    }

    fn render_filter_panel(&self, state: &FilterState) {
        emit(&format_filter_panel(state));
    }

    fn render_products(&self, products: &[Product]) {
        let grid: Vec<String> = products
            .iter()
            .enumerate()
            .map(|(idx, product)| format_card(idx, product))
            .collect();
        emit(&grid.join("\n"));
    }

    fn show_summary(&self, text: &str) {
        emit(&format!("---- {text} ----"));
    }

    fn set_loading(&self, visible: bool) {
        if visible {
            emit(LOADING_MESSAGE);
        }
    }

    fn show_error(&self, message: Option<&str>) {
        if let Some(message) = message {
            emit(&format!("[오류] {message}"));
        }
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        emit(&format!("→ {path}"));
    }
}
