use super::{expect_string, NativeModule};
use crate::{
    config::InterpreterConfig,
    driver,
    interpreter::SystemContext,
    value::{error::RuntimeErrorKind, NativeFunction, Value},
};
use std::sync::Arc;

/// Runs another script and exposes its top-level bindings as a read-only object.
#[derive(Debug)]
pub struct Import {
    config: InterpreterConfig,
}

impl Import {
    pub fn value(config: &InterpreterConfig) -> Value {
        Value::NativeFunction(Arc::new(Self {
            config: config.clone(),
        }))
    }
}

impl NativeFunction for Import {
    fn call(
        &self,
        context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        let [module] = arguments else {
            return Err(RuntimeErrorKind::InvalidNumberOfArguments);
        };
        let path = self.config.resolve(expect_string(module)?);
        tracing::debug!(path = %path.display(), "importing module");

        match driver::load_module(&path, &self.config, context) {
            Ok(environment) => {
                let module = NativeModule::new(path.display().to_string(), environment.bindings());
                tracing::debug!(module = module.name(), "module loaded");
                Ok(module.value())
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "module failed to load");
                Err(RuntimeErrorKind::ImportError)
            }
        }
    }
}
