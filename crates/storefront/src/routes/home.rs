//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{Category, Product};
use crate::filters;
use crate::routes::cart::load_cart_view;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub name: String,
    pub image: String,
    pub description: String,
    pub price: String,
    /// Already in the visitor's cart; the add button is disabled.
    pub in_cart: bool,
}

impl ProductView {
    #[must_use]
    pub fn from_product(product: &Product, in_cart: bool) -> Self {
        Self {
            handle: product.handle.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            price: product.cost.to_string(),
            in_cart,
        }
    }
}

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub products: Vec<ProductView>,
}

impl CategoryView {
    fn new(category: &Category, in_cart: impl Fn(&Product) -> bool) -> Self {
        Self {
            name: category.name.clone(),
            products: category
                .products
                .iter()
                .map(|p| ProductView::from_product(p, in_cart(p)))
                .collect(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryView>,
    pub cart_count: u32,
}

/// Display home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart_view(&state, &session).await;

    let categories = state
        .catalog()
        .categories()
        .iter()
        .map(|category| CategoryView::new(category, |p| cart.contains(&p.name)))
        .collect();

    HomeTemplate {
        categories,
        cart_count: cart.item_count,
    }
}
