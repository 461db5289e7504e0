// ==========================================
// SupplySight 库存驾驶舱 - 查询缓存
// ==========================================
// 键: (操作名, 变量的规范 JSON)
// 值: serde_json::Value（命中时再反序列化）
// 失效规则:
// - 任一变更成功 → 失效所有依赖产品行的查询（产品列表 / 汇总 / 趋势）
// - 可选 TTL（0 表示不过期）
// 世代号: 每个操作名一个计数器,失效即 +1；
//        请求发出前记录世代,写回时世代已变则丢弃（防止旧响应覆盖）
// ==========================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::client::operations::Operation;

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: &'static str,
    pub variables: String,
}

impl CacheKey {
    pub fn for_operation<O: Operation>(op: &O) -> Result<Self, serde_json::Error> {
        Ok(Self {
            operation: O::NAME,
            variables: serde_json::to_string(op)?,
        })
    }
}

/// 请求票据: 发出请求时的世代号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTicket {
    key: CacheKey,
    generation: u64,
    epoch: u64,
}

impl CacheTicket {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

// ==========================================
// QueryCache - 查询缓存
// ==========================================
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    generations: HashMap<&'static str, u64>,
    // clear() 时 +1,使全部在途请求失效
    epoch: u64,
    ttl: Option<Duration>,
}

impl QueryCache {
    /// 创建缓存
    ///
    /// # 参数
    /// - ttl: 条目有效期；None 表示不过期
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            generations: HashMap::new(),
            epoch: 0,
            ttl,
        }
    }

    fn generation(&self, operation: &str) -> u64 {
        self.generations.get(operation).copied().unwrap_or(0)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.duration_since(entry.stored_at) < ttl,
            None => true,
        }
    }

    /// 读取缓存（过期条目视为未命中并移除）
    pub fn get<T: DeserializeOwned>(&mut self, key: &CacheKey) -> Option<T> {
        let now = Instant::now();
        let fresh = match self.entries.get(key) {
            Some(entry) => self.is_fresh(entry, now),
            None => return None,
        };
        if !fresh {
            self.entries.remove(key);
            return None;
        }

        let entry = self.entries.get(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(operation = key.operation, error = %e, "缓存条目反序列化失败,已丢弃");
                self.entries.remove(key);
                None
            }
        }
    }

    /// 发出请求前领取票据
    pub fn ticket(&self, key: CacheKey) -> CacheTicket {
        let generation = self.generation(key.operation);
        CacheTicket {
            key,
            generation,
            epoch: self.epoch,
        }
    }

    /// 写回响应
    ///
    /// # 返回
    /// - true: 已写入
    /// - false: 请求期间该操作已失效,响应被丢弃
    pub fn put<T: Serialize>(&mut self, ticket: CacheTicket, value: &T) -> bool {
        if ticket.epoch != self.epoch || ticket.generation != self.generation(ticket.key.operation) {
            tracing::debug!(operation = ticket.key.operation, "请求期间缓存已失效,丢弃旧响应");
            return false;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(
                    ticket.key,
                    CacheEntry {
                        value,
                        stored_at: Instant::now(),
                    },
                );
                true
            }
            Err(e) => {
                tracing::warn!(operation = ticket.key.operation, error = %e, "响应序列化失败,不写入缓存");
                false
            }
        }
    }

    /// 失效某操作的全部条目（不论变量）
    pub fn invalidate_operation(&mut self, operation: &'static str) -> usize {
        *self.generations.entry(operation).or_insert(0) += 1;
        let before = self.entries.len();
        self.entries.retain(|key, _| key.operation != operation);
        before - self.entries.len()
    }

    /// 失效多个操作
    pub fn invalidate_operations(&mut self, operations: &[&'static str]) -> usize {
        operations
            .iter()
            .map(|op| self.invalidate_operation(op))
            .sum()
    }

    /// 清空全部条目
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
