use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        transactions::{CheckoutItem, CheckoutRequest, TransactionList},
    },
    error::{ErrorData, ErrorKind},
    models::{Category, Product, ReportSummary, TopProduct, Transaction, TransactionDetail},
    response::{ApiResponse, Meta},
    routes::{categories, health, params, products, reports, transactions},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health_check,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        transactions::checkout,
        transactions::list_transactions,
        transactions::get_transaction,
        reports::report_today,
        reports::report_between
    ),
    components(
        schemas(
            Product,
            Category,
            Transaction,
            TransactionDetail,
            ReportSummary,
            TopProduct,
            CreateProductRequest,
            UpdateProductRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CheckoutItem,
            CheckoutRequest,
            ProductList,
            CategoryList,
            TransactionList,
            ErrorData,
            ErrorKind,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Transaction>,
            ApiResponse<TransactionList>,
            ApiResponse<ReportSummary>,
            ApiResponse<ErrorData>
        )
    ),
    tags(
        (name = "Health", description = "Service banner and health check"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Transactions", description = "Checkout and sales ledger"),
        (name = "Reports", description = "Sales summaries"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
