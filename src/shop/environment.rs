use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};

use super::model::{Form, ShopError, ValidateShopNameResponse};

/// Operations the shop reducer may start. Each returns a stream that emits
/// zero or more results and then completes; implementations must be safe to
/// call from concurrent effects.
pub trait ShopEnvironment: Send + Sync + 'static {
    fn check_shop_name(&self, name: &str) -> BoxStream<'static, ValidateShopNameResponse>;

    fn check_domain_name(&self, domain: &str) -> BoxStream<'static, Result<(), ShopError>>;

    fn submit(&self, form: Form) -> BoxStream<'static, Result<(), ShopError>>;
}

impl<T: ShopEnvironment + ?Sized> ShopEnvironment for Arc<T> {
    fn check_shop_name(&self, name: &str) -> BoxStream<'static, ValidateShopNameResponse> {
        (**self).check_shop_name(name)
    }

    fn check_domain_name(&self, domain: &str) -> BoxStream<'static, Result<(), ShopError>> {
        (**self).check_domain_name(domain)
    }

    fn submit(&self, form: Form) -> BoxStream<'static, Result<(), ShopError>> {
        (**self).submit(form)
    }
}

/// A stream with exactly one item.
pub fn just<T: Send + 'static>(value: T) -> BoxStream<'static, T> {
    stream::once(async move { value }).boxed()
}

type CheckShopName = Arc<dyn Fn(&str) -> BoxStream<'static, ValidateShopNameResponse> + Send + Sync>;
type CheckDomainName = Arc<dyn Fn(&str) -> BoxStream<'static, Result<(), ShopError>> + Send + Sync>;
type Submit = Arc<dyn Fn(Form) -> BoxStream<'static, Result<(), ShopError>> + Send + Sync>;

/// Environment assembled from closures, one per operation. Mostly for
/// tests: start from [`UseCase::mock`] and replace what the test needs.
#[derive(Clone)]
pub struct UseCase {
    check_shop_name: CheckShopName,
    check_domain_name: CheckDomainName,
    submit: Submit,
}

impl UseCase {
    pub fn new(
        check_shop_name: impl Fn(&str) -> BoxStream<'static, ValidateShopNameResponse>
            + Send
            + Sync
            + 'static,
        check_domain_name: impl Fn(&str) -> BoxStream<'static, Result<(), ShopError>>
            + Send
            + Sync
            + 'static,
        submit: impl Fn(Form) -> BoxStream<'static, Result<(), ShopError>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            check_shop_name: Arc::new(check_shop_name),
            check_domain_name: Arc::new(check_domain_name),
            submit: Arc::new(submit),
        }
    }

    /// Every operation completes without emitting anything.
    pub fn mock() -> Self {
        Self::new(
            |_| stream::empty().boxed(),
            |_| stream::empty().boxed(),
            |_| stream::empty().boxed(),
        )
    }

    pub fn with_check_shop_name(
        mut self,
        f: impl Fn(&str) -> BoxStream<'static, ValidateShopNameResponse> + Send + Sync + 'static,
    ) -> Self {
        self.check_shop_name = Arc::new(f);
        self
    }

    pub fn with_check_domain_name(
        mut self,
        f: impl Fn(&str) -> BoxStream<'static, Result<(), ShopError>> + Send + Sync + 'static,
    ) -> Self {
        self.check_domain_name = Arc::new(f);
        self
    }

    pub fn with_submit(
        mut self,
        f: impl Fn(Form) -> BoxStream<'static, Result<(), ShopError>> + Send + Sync + 'static,
    ) -> Self {
        self.submit = Arc::new(f);
        self
    }
}

impl ShopEnvironment for UseCase {
    fn check_shop_name(&self, name: &str) -> BoxStream<'static, ValidateShopNameResponse> {
        (self.check_shop_name)(name)
    }

    fn check_domain_name(&self, domain: &str) -> BoxStream<'static, Result<(), ShopError>> {
        (self.check_domain_name)(domain)
    }

    fn submit(&self, form: Form) -> BoxStream<'static, Result<(), ShopError>> {
        (self.submit)(form)
    }
}
