//! Unsigned transaction drafts.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, transaction::Transaction};

/// Who sends and who pays for a transaction being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Owner of the funds / authority for the operation.
    pub sender:     Pubkey,
    /// Separate fee payer, if someone else sponsors the transaction.
    pub fee_payer:  Option<Pubkey>,
    /// AMM program the pool instructions target.
    pub program_id: Pubkey,
}

impl BuildContext {
    pub fn new(sender: Pubkey, program_id: Pubkey) -> Self {
        Self { sender, fee_payer: None, program_id }
    }

    pub fn with_fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// The explicit fee payer, else the sender.
    pub fn payer(&self) -> Pubkey {
        self.fee_payer.unwrap_or(self.sender)
    }
}

/// An unsigned transaction: fee payer plus instructions in submission order.
///
/// Drafts are plain values; nothing is shared between them. The signing
/// adapter attaches a blockhash and turns one into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDraft {
    fee_payer:    Pubkey,
    instructions: Vec<Instruction>,
}

impl TxDraft {
    pub fn new(fee_payer: Pubkey) -> Self {
        Self { fee_payer, instructions: Vec::new() }
    }

    pub fn for_context(ctx: &BuildContext) -> Self {
        Self::new(ctx.payer())
    }

    pub fn push(&mut self, ix: Instruction) -> &mut Self {
        self.instructions.push(ix);
        self
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.fee_payer
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Unsigned transaction with a zero blockhash.
    pub fn to_transaction(&self) -> Transaction {
        Transaction::new_with_payer(&self.instructions, Some(&self.fee_payer))
    }

    /// Every key that must sign, fee payer first.
    pub fn required_signers(&self) -> Vec<Pubkey> {
        let tx = self.to_transaction();
        let n = tx.message.header.num_required_signatures as usize;
        tx.message.account_keys[..n].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    #[test]
    fn payer_defaults_to_sender() {
        let sender = Pubkey::new_unique();
        let ctx = BuildContext::new(sender, Pubkey::new_unique());
        assert_eq!(ctx.payer(), sender);

        let sponsor = Pubkey::new_unique();
        assert_eq!(ctx.with_fee_payer(sponsor).payer(), sponsor);
    }

    #[test]
    fn required_signers_lists_fee_payer_first() {
        let payer = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let mut draft = TxDraft::new(payer);
        draft.push(Instruction {
            program_id: Pubkey::new_unique(),
            accounts:   vec![AccountMeta::new_readonly(other, true)],
            data:       vec![],
        });

        assert_eq!(draft.required_signers(), vec![payer, other]);
        assert_eq!(draft.to_transaction().message.account_keys[0], payer);
    }
}
